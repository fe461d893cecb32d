use crate::app::App;
use crate::stats::{self, WINDOW_DAYS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph, Row, Table},
    Frame,
};

/// 统计视图：每日完成率柱状图 + 汇总 + 每个 duty 的进度
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let today = app.today();
    let duties = app.store.duties();
    let daily = stats::daily_completion(duties, today, WINDOW_DAYS);
    let summary = stats::summarize(&daily);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 汇总
            Constraint::Length(14), // 柱状图
            Constraint::Min(0),     // 明细表
        ])
        .split(area);

    let summary_line = Line::from(vec![
        Span::raw(" 最近 "),
        Span::styled(
            summary.days.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" 天  全部完成: "),
        Span::styled(
            summary.perfect_days.to_string(),
            Style::default()
                .fg(Color::Rgb(163, 190, 140))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" 天  平均完成率: "),
        Span::styled(
            format!("{}%", summary.average_percentage),
            Style::default()
                .fg(Color::Rgb(136, 192, 208))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(
        Paragraph::new(summary_line).block(panel_block(" 概览 ")),
        chunks[0],
    );

    let bars: Vec<Bar> = daily
        .iter()
        .map(|day| {
            let color = if day.is_perfect() {
                Color::Rgb(163, 190, 140)
            } else {
                Color::Rgb(94, 129, 172)
            };
            Bar::default()
                .value(day.percentage as u64)
                .label(Line::from(day.date.format("%d").to_string()))
                .text_value(format!("{}%", day.percentage))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel_block(" 每日完成率 "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .max(100);
    f.render_widget(chart, chunks[1]);

    let rows: Vec<Row> = stats::per_duty(duties, today)
        .into_iter()
        .map(|stat| {
            Row::new(vec![
                format!("{} {}", stat.icon, stat.name),
                format!("{}/{}", stat.completed, stat.duration),
                format!("{:.0}%", stat.progress * 100.0),
                format!("{} 天", stat.streak),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Duty", "完成", "进度", "连续"]).style(
            Style::default()
                .fg(Color::Rgb(235, 203, 139))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(panel_block(" 进度 "));
    f.render_widget(table, chunks[2]);
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(76, 86, 106)))
}

use chrono::Datelike;
use crate::app::App;
use crate::calendar::{self, CalendarCell, DAY_LABELS};
use crate::models::Duty;
use crate::ui::duty_color;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// 渲染 duty 视图：左侧列表，右侧选中 duty 的卡片
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.store.duties().is_empty() {
        render_empty(f, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_list(f, columns[0], app);
    if let Some(duty) = app.selected_duty() {
        render_card(f, columns[1], duty, app);
    }
}

fn render_empty(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded);

    let paragraph = Paragraph::new("还没有 duty - 按 n 新建，按 a 从归档恢复")
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));

    f.render_widget(paragraph, area);
}

/// 渲染 duty 列表
fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let today = app.today();
    let items: Vec<ListItem> = app
        .store
        .duties()
        .iter()
        .enumerate()
        .map(|(i, duty)| {
            let is_selected = i == app.selected;
            let style = if is_selected {
                Style::default()
                    .bg(Color::Rgb(59, 66, 82))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            // 选中指示器
            let indicator = if is_selected {
                Span::styled("▶ ", Style::default().fg(Color::White))
            } else {
                Span::raw("  ")
            };

            let done_today = if duty.is_completed(today) {
                Span::styled(" ✓", Style::default().fg(Color::Rgb(163, 190, 140)))
            } else {
                Span::raw("")
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(" "),
                    indicator,
                    Span::raw(format!("{} ", duty.icon)),
                    Span::styled(&duty.name, Style::default().fg(duty_color(duty.color))),
                    done_today,
                ]),
                Line::from(Span::styled(
                    format!("      {}/{} 天", duty.completed_days.len(), duty.duration),
                    Style::default().fg(Color::Rgb(129, 161, 193)),
                )),
            ])
            .style(style)
        })
        .collect();

    let title = format!(" Duties ({}) ", items.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .border_type(BorderType::Rounded),
    );

    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// 渲染 duty 卡片：标题、描述、进度、月历
fn render_card(f: &mut Frame, area: Rect, duty: &Duty, app: &App) {
    let accent = duty_color(duty.color);
    let block = Block::default()
        .title(format!(" {} {} ", duty.icon, duty.name))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // 描述
            Constraint::Length(1), // 进度条
            Constraint::Length(1),
            Constraint::Min(0), // 日历
        ])
        .split(inner);

    let description = if duty.description.is_empty() {
        Paragraph::new("(无描述)").style(Style::default().fg(Color::Rgb(76, 86, 106)))
    } else {
        Paragraph::new(duty.description.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Rgb(216, 222, 233)))
    };
    f.render_widget(description, chunks[0]);

    let progress = duty.progress().min(1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(accent).bg(Color::Rgb(59, 66, 82)))
        .ratio(progress)
        .label(format!(
            "{}/{} 天  连续 {} 天",
            duty.completed_days.len(),
            duty.duration,
            duty.current_streak(app.today())
        ));
    f.render_widget(gauge, chunks[1]);

    render_calendar(f, chunks[3], duty, app);
}

/// 渲染月历网格，周一开头
fn render_calendar(f: &mut Frame, area: Rect, duty: &Duty, app: &App) {
    let today = app.today();
    let start = duty.start_date();
    let accent = duty_color(duty.color);
    let cells = calendar::month_grid(app.month, &duty.completed_days, today);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  ◀ [  {}  ] ▶", app.month.label()),
            Style::default()
                .fg(Color::Rgb(236, 239, 244))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(
            DAY_LABELS
                .iter()
                .map(|label| {
                    Span::styled(
                        format!(" {:^3}", label),
                        Style::default().fg(Color::Rgb(129, 161, 193)),
                    )
                })
                .collect::<Vec<_>>(),
        ),
    ];

    for week in calendar::weeks(&cells) {
        let spans: Vec<Span> = week
            .iter()
            .map(|cell| match cell {
                CalendarCell::Filler => Span::raw("    "),
                CalendarCell::Day(day) => {
                    let tracked = day.is_interactive() && day.date >= start;
                    let mut style = if day.completed {
                        Style::default().fg(Color::Rgb(46, 52, 64)).bg(accent)
                    } else if !tracked {
                        // 未来日期和创建前的日期显示为不可操作
                        Style::default().fg(Color::Rgb(76, 86, 106))
                    } else {
                        Style::default().fg(Color::Rgb(216, 222, 233))
                    };
                    if day.today {
                        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                    }
                    if day.date == app.cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }

                    Span::styled(format!(" {:>2} ", day.date.day()), style)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        cursor_hint(duty, app),
        Style::default().fg(Color::Rgb(129, 161, 193)),
    )));

    f.render_widget(Paragraph::new(lines), area);
}

fn cursor_hint(duty: &Duty, app: &App) -> String {
    let today = app.today();
    let date = app.cursor;
    let status = if date > today {
        "未来日期，不可标记"
    } else if date < duty.start_date() {
        "早于创建日期"
    } else if duty.is_completed(date) {
        "已完成 - 空格取消"
    } else {
        "未完成 - 空格标记"
    };
    format!("  {}  {}", date.format("%Y-%m-%d %a"), status)
}

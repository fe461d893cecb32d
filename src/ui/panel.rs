use crate::app::{App, Mode};
use crate::models::duty::ICONS;
use crate::models::DutyColor;
use crate::ui::duty_color;
use crate::ui::form::{FormField, PanelTab};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

/// 渲染右侧面板
pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    f.render_widget(Clear, area);

    let focused = app.mode == Mode::Panel;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused {
            Color::Rgb(136, 192, 208)
        } else {
            Color::Rgb(76, 86, 106)
        }))
        .style(Style::default().bg(Color::Rgb(46, 52, 64)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let selected = match app.panel.tab {
        PanelTab::CreateNew => 0,
        PanelTab::AddExisting => 1,
    };
    let archived = app.store.archive().len();
    let tabs = Tabs::new(vec![
        "Create New".to_string(),
        format!("Add Existing ({})", archived),
    ])
    .select(selected)
    .style(Style::default().fg(Color::Rgb(129, 161, 193)))
    .highlight_style(
        Style::default()
            .fg(Color::Rgb(236, 239, 244))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    );
    f.render_widget(tabs, chunks[0]);

    match app.panel.tab {
        PanelTab::CreateNew => render_create(f, chunks[1], app, focused),
        PanelTab::AddExisting => render_archive(f, chunks[1], app),
    }
}

/// 新建表单
fn render_create(f: &mut Frame, area: Rect, app: &mut App, focused: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 名称
            Constraint::Length(3), // 描述
            Constraint::Length(2), // 图标
            Constraint::Length(2), // 颜色
            Constraint::Length(3), // 天数
            Constraint::Length(1),
            Constraint::Length(1), // 提交按钮
            Constraint::Min(0),
        ])
        .split(area);

    let panel = &mut app.panel;
    let field = panel.field;
    let active = |which: FormField| focused && field == which;

    panel.name.render(f, chunks[0], "名称 *", active(FormField::Name));
    panel
        .description
        .render(f, chunks[1], "描述", active(FormField::Description));

    // 图标选择
    let icon_spans: Vec<Span> = ICONS
        .iter()
        .enumerate()
        .map(|(i, icon)| {
            if i == panel.icon {
                Span::styled(
                    format!("[{}]", icon),
                    Style::default().bg(Color::Rgb(59, 66, 82)),
                )
            } else {
                Span::raw(format!(" {} ", icon))
            }
        })
        .collect();
    render_picker(f, chunks[2], "图标", icon_spans, active(FormField::Icon));

    // 颜色选择
    let color_spans: Vec<Span> = DutyColor::ALL
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let marker = if i == panel.color { "◉" } else { "●" };
            Span::styled(
                format!("{} ", marker),
                Style::default().fg(duty_color(*color)),
            )
        })
        .collect();
    let color_name = DutyColor::ALL[panel.color % DutyColor::ALL.len()].name();
    let mut color_spans = color_spans;
    color_spans.push(Span::styled(
        color_name,
        Style::default().fg(Color::Rgb(129, 161, 193)),
    ));
    render_picker(f, chunks[3], "颜色", color_spans, active(FormField::Color));

    panel
        .duration
        .render(f, chunks[4], "目标天数 (1-365)", active(FormField::Duration));

    // 名称为空时按钮置灰
    let button_style = if panel.can_submit() {
        Style::default()
            .bg(Color::Rgb(163, 190, 140))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(76, 86, 106))
            .add_modifier(Modifier::DIM)
    };
    f.render_widget(
        Paragraph::new(" Enter 创建 ")
            .style(button_style)
            .alignment(Alignment::Center),
        chunks[6],
    );
}

fn render_picker(f: &mut Frame, area: Rect, label: &str, spans: Vec<Span>, active: bool) {
    let label_style = if active {
        Style::default()
            .fg(Color::Rgb(136, 192, 208))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(129, 161, 193))
    };
    let arrow = if active { "◀▶ " } else { "   " };

    let mut line = vec![
        Span::styled(format!(" {} ", label), label_style),
        Span::styled(arrow, label_style),
    ];
    line.extend(spans);
    f.render_widget(Paragraph::new(Line::from(line)), area);
}

/// 归档列表
fn render_archive(f: &mut Frame, area: Rect, app: &App) {
    let archive = app.store.archive();
    if archive.is_empty() {
        f.render_widget(
            Paragraph::new("归档为空")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Rgb(76, 86, 106))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = archive
        .items()
        .iter()
        .enumerate()
        .map(|(i, duty)| {
            let is_selected = i == app.panel.archive_selected;
            let style = if is_selected {
                Style::default()
                    .bg(Color::Rgb(59, 66, 82))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(format!(" {} ", duty.icon)),
                    Span::styled(&duty.name, Style::default().fg(duty_color(duty.color))),
                ]),
                Line::from(Span::styled(
                    format!(
                        "    {}/{} 天  创建于 {}",
                        duty.completed_days.len(),
                        duty.duration,
                        duty.start_date().format("%Y-%m-%d")
                    ),
                    Style::default().fg(Color::Rgb(129, 161, 193)),
                )),
            ])
            .style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.panel.archive_selected));
    f.render_stateful_widget(List::new(items), area, &mut state);
}

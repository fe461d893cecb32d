mod cards;
pub mod dialogs;
pub mod form;
mod help;
mod navbar;
mod panel;
mod stats;
pub mod text_input;

use crate::app::{App, Mode, View};
use crate::models::DutyColor;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;
use ratatui::Frame;

/// 主渲染函数
pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 导航栏
            Constraint::Min(0),    // 主内容区域
            Constraint::Length(1), // 快捷键提示
        ])
        .split(f.area());

    navbar::render(f, chunks[0], app);

    match app.view {
        View::Duties => {
            // 面板打开时右侧分出一列
            if app.mode == Mode::Panel || app.return_to_panel() {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(0), Constraint::Length(46)])
                    .split(chunks[1]);
                cards::render(f, columns[0], app);
                panel::render(f, columns[1], app);
            } else {
                cards::render(f, chunks[1], app);
            }
        }
        View::Stats => stats::render(f, chunks[1], app),
    }

    navbar::render_hints(f, chunks[2], app);

    // 渲染对话框（如果有）
    if let Some(dialog) = &mut app.dialog {
        dialogs::render_dialog(f, dialog);
    }

    // 渲染帮助面板（如果处于帮助模式）
    if app.mode == Mode::Help {
        help::render(f, f.area());
    }

    // 渲染通知栏（如果有通知）
    if let Some(ref notification) = app.notification {
        render_notification(f, f.area(), notification);
    }
}

/// duty 主题色 → 终端颜色
pub fn duty_color(color: DutyColor) -> Color {
    match color {
        DutyColor::Blue => Color::Rgb(94, 129, 172),
        DutyColor::Green => Color::Rgb(163, 190, 140),
        DutyColor::Purple => Color::Rgb(180, 142, 173),
        DutyColor::Red => Color::Rgb(191, 97, 106),
        DutyColor::Yellow => Color::Rgb(235, 203, 139),
        DutyColor::Pink => Color::Rgb(216, 140, 170),
        DutyColor::Indigo => Color::Rgb(129, 161, 193),
        DutyColor::Teal => Color::Rgb(143, 188, 187),
    }
}

/// 渲染通知栏
fn render_notification(f: &mut Frame, area: Rect, notification: &crate::app::Notification) {
    use crate::app::NotificationLevel;
    use ratatui::style::{Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    // 通知栏在底部，占 3 行
    let height = 3.min(area.height);
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height + 1),
        width: area.width,
        height,
    };

    // 根据级别选择颜色
    let (bg_color, fg_color, prefix) = match notification.level {
        NotificationLevel::Info => (Color::Blue, Color::White, "ℹ"),
        NotificationLevel::Success => (Color::Green, Color::White, "✓"),
        NotificationLevel::Warning => (Color::Yellow, Color::Black, "⚠"),
        NotificationLevel::Error => (Color::Red, Color::White, "✗"),
    };

    let content = Line::from(vec![
        Span::styled(
            format!(" {} ", prefix),
            Style::default()
                .fg(fg_color)
                .bg(bg_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&notification.message, Style::default().fg(fg_color)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(bg_color))
        .style(Style::default().bg(bg_color));

    f.render_widget(Clear, notification_area);
    f.render_widget(Paragraph::new(content).block(block), notification_area);
}

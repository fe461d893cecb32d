use crate::app::{App, Mode, View};
use crate::store::Backend;
use crate::ui::form::PanelTab;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
    Frame,
};

/// 顶部导航栏：应用名、标签页、登录状态
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(76, 86, 106)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(18),
            Constraint::Min(0),
            Constraint::Length(36),
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(vec![
        Span::raw(" ✅ "),
        Span::styled(
            "Duty Tracker",
            Style::default()
                .fg(Color::Rgb(136, 192, 208))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(title, chunks[0]);

    let selected = match app.view {
        View::Duties => 0,
        View::Stats => 1,
    };
    let tabs = Tabs::new(vec!["Duties", "Stats"])
        .select(selected)
        .style(Style::default().fg(Color::Rgb(129, 161, 193)))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(236, 239, 244))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    f.render_widget(tabs, chunks[1]);

    let (icon, color) = match app.store.backend() {
        Backend::Remote => ("☁", Color::Rgb(163, 190, 140)),
        Backend::Local => ("💾", Color::Rgb(235, 203, 139)),
    };
    let account = if app.store.is_authenticated() {
        "L 退出"
    } else {
        "L 登录"
    };
    let mut spans = Vec::new();
    // 迁移提示被关闭后留一个标记
    if app.migration.is_prompting() && app.dialog.is_none() {
        spans.push(Span::styled(
            "m 迁移本地数据  ",
            Style::default()
                .fg(Color::Rgb(208, 135, 112))
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.extend([
        Span::styled(format!("{} {}", icon, app.backend_label()), Style::default().fg(color)),
        Span::raw("  "),
        Span::styled(account, Style::default().fg(Color::Rgb(76, 86, 106))),
        Span::raw(" "),
    ]);
    let auth = Paragraph::new(Line::from(spans))
    .alignment(Alignment::Right);
    f.render_widget(auth, chunks[2]);
}

/// 底部快捷键提示：模式标签 + 当前可用按键
pub fn render_hints(f: &mut Frame, area: Rect, app: &App) {
    let (mode_text, mode_color) = match app.mode {
        Mode::Normal => ("NORMAL", Color::Green),
        Mode::Panel => ("PANEL", Color::Cyan),
        Mode::Dialog => ("DIALOG", Color::Magenta),
        Mode::Help => ("HELP", Color::Blue),
    };

    let hints = match (app.mode, app.view) {
        (Mode::Panel, _) if app.panel.tab == PanelTab::CreateNew => {
            "↑↓ 字段  ←→ 图标/颜色  Enter 创建  Ctrl+T 归档  Esc 关闭"
        }
        (Mode::Panel, _) => "j/k 选择  Enter 恢复  d 永久删除  Ctrl+T 新建  Esc 关闭",
        (Mode::Normal, View::Stats) => "Tab 切换视图  r 刷新  ? 帮助  q 退出",
        (Mode::Normal, View::Duties) => {
            "j/k duty  h/l 日期  [ ] 月份  空格 标记  n 新建  a 归档  d 删除  Tab 统计  ? 帮助"
        }
        _ => "",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_text),
            Style::default()
                .fg(Color::Black)
                .bg(mode_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::Rgb(129, 161, 193))),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

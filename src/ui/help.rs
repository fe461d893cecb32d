use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::dialogs::centered_rect;

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key<'a>(keys: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", keys), Style::default().fg(Color::Cyan)),
        Span::raw(desc),
    ])
}

/// 渲染帮助面板
pub fn render(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(80, 80, area);

    // 清空弹窗区域
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" 键盘快捷键帮助 (按 ESC 或 ? 关闭) ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .style(Style::default().bg(Color::Black));

    f.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(inner);

    // 左列：导航
    let navigation = vec![
        heading("导航"),
        Line::from(""),
        key("j, ↓", "下一个 duty"),
        key("k, ↑", "上一个 duty"),
        key("h, ←", "前一天"),
        key("l, →", "后一天"),
        key("K / J", "上一周 / 下一周"),
        key("[ / ]", "上个月 / 下个月"),
        key("t", "回到今天"),
        key("Tab", "切换 Duties / Stats"),
        key("q", "退出程序"),
    ];

    // 中列：操作
    let actions = vec![
        heading("Duty 操作"),
        Line::from(""),
        key("空格, Enter", "标记 / 取消完成"),
        key("n", "新建 duty"),
        key("a", "打开归档"),
        key("d", "删除（移到归档）"),
        key("r", "重新加载"),
        key("L", "登录 / 退出登录"),
        key("m", "迁移本地数据"),
        Line::from(""),
        heading("侧边面板"),
        Line::from(""),
        key("↑↓, Tab", "切换字段"),
        key("←→", "选择图标 / 颜色"),
        key("Ctrl+T", "新建 / 归档"),
        key("Enter", "创建 / 恢复"),
        key("d", "永久删除归档"),
    ];

    // 右列：对话框与提示
    let dialogs = vec![
        heading("对话框"),
        Line::from(""),
        key("y / n", "确认 / 取消"),
        key("←→", "切换按钮"),
        key("空格", "勾选\"不再提示\""),
        key("Ctrl+N", "登录 / 注册切换"),
        key("Esc", "关闭"),
        Line::from(""),
        heading("提示"),
        Line::from(""),
        Line::from("• 未来日期不能标记"),
        Line::from("• 修改一周以前的日期需要确认"),
        Line::from("• 删除的 duty 可以从归档恢复"),
        Line::from("• 登录后数据保存到云端"),
    ];

    f.render_widget(
        Paragraph::new(navigation)
            .block(Block::default().borders(Borders::RIGHT))
            .wrap(Wrap { trim: false }),
        columns[0],
    );
    f.render_widget(
        Paragraph::new(actions)
            .block(Block::default().borders(Borders::RIGHT))
            .wrap(Wrap { trim: false }),
        columns[1],
    );
    f.render_widget(Paragraph::new(dialogs).wrap(Wrap { trim: false }), columns[2]);
}

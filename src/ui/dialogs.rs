use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::text_input::LineInput;

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    /// 修改 7 天以前的日期
    ToggleOldDate { duty_id: i64, date: NaiveDate },
    DeleteDuty(i64),
    DeleteArchived(i64),
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// 登录 / 注册表单
pub struct LoginForm {
    pub email: LineInput,
    pub password: LineInput,
    pub field: LoginField,
    pub sign_up: bool,
    pub error: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            email: LineInput::new("you@example.com"),
            password: LineInput::masked("password"),
            field: LoginField::Email,
            sign_up: false,
            error: None,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn focused_input(&mut self) -> &mut LineInput {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.value().trim().is_empty() && !self.password.value().is_empty()
    }
}

/// 对话框类型
pub enum DialogType {
    /// 确认对话框；`dont_ask` 为 Some 时显示"不再提示"选项
    Confirm {
        title: String,
        message: String,
        yes_selected: bool,
        action: ConfirmAction,
        dont_ask: Option<bool>,
    },
    Login(LoginForm),
    /// 首次登录时询问是否迁移本地数据
    Migration { count: usize, yes_selected: bool },
}

/// 渲染居中的对话框
pub fn render_dialog(f: &mut Frame, dialog: &mut DialogType) {
    let area = match dialog {
        DialogType::Login(_) => centered_rect(50, 50, f.area()),
        _ => centered_rect(50, 35, f.area()),
    };

    // 清空对话框区域
    f.render_widget(Clear, area);

    match dialog {
        DialogType::Confirm {
            title,
            message,
            yes_selected,
            dont_ask,
            ..
        } => render_confirm_dialog(f, area, title, message, *yes_selected, *dont_ask),
        DialogType::Login(form) => render_login_dialog(f, area, form),
        DialogType::Migration {
            count,
            yes_selected,
        } => {
            let message = format!(
                "本地有 {} 个 duty。是否上传到云端账户？\n\n选择\"否\"将保留本地数据，之后不再询问。",
                count
            );
            render_confirm_dialog(f, area, "迁移本地数据", &message, *yes_selected, None);
        }
    }
}

fn dialog_block(title: &str, border: Color) -> Block<'_> {
    Block::default()
        .title(format!("  {}  ", title))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Rgb(46, 52, 64))) // Nord background
}

/// 渲染确认对话框
fn render_confirm_dialog(
    f: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    yes_selected: bool,
    dont_ask: Option<bool>,
) {
    let block = dialog_block(title, Color::Rgb(235, 203, 139)); // Nord yellow for warnings
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // 消息
            Constraint::Length(if dont_ask.is_some() { 2 } else { 0 }),
            Constraint::Length(3), // 按钮
        ])
        .split(inner);

    let message_text = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Rgb(216, 222, 233)));
    f.render_widget(message_text, chunks[0]);

    if let Some(checked) = dont_ask {
        let mark = if checked { "[x]" } else { "[ ]" };
        let line = Line::from(vec![
            Span::styled(mark, Style::default().fg(Color::Rgb(136, 192, 208))),
            Span::raw(" 不再提示  "),
            Span::styled("(空格切换)", Style::default().fg(Color::Rgb(76, 86, 106))),
        ]);
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[1]);
    }

    render_buttons(f, chunks[2], yes_selected);
}

fn render_buttons(f: &mut Frame, area: Rect, yes_selected: bool) {
    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    // 否按钮 (n) - 放在左侧
    let no_style = if !yes_selected {
        Style::default()
            .bg(Color::Rgb(191, 97, 106))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(191, 97, 106))
            .add_modifier(Modifier::DIM)
    };
    f.render_widget(
        Paragraph::new("[ n ] 否")
            .style(no_style)
            .alignment(Alignment::Center),
        button_chunks[1],
    );

    let yes_style = if yes_selected {
        Style::default()
            .bg(Color::Rgb(163, 190, 140))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(163, 190, 140))
            .add_modifier(Modifier::DIM)
    };
    f.render_widget(
        Paragraph::new("[ y ] 是")
            .style(yes_style)
            .alignment(Alignment::Center),
        button_chunks[2],
    );
}

/// 渲染登录对话框
fn render_login_dialog(f: &mut Frame, area: Rect, form: &mut LoginForm) {
    let title = if form.sign_up { "注册" } else { "登录" };
    let block = dialog_block(title, Color::Rgb(136, 192, 208));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 邮箱
            Constraint::Length(3), // 密码
            Constraint::Length(2), // 错误信息
            Constraint::Min(0),
            Constraint::Length(1), // 帮助
        ])
        .split(inner);

    let field = form.field;
    form.email.render(f, chunks[0], "邮箱", field == LoginField::Email);
    form.password
        .render(f, chunks[1], "密码", field == LoginField::Password);

    if let Some(error) = &form.error {
        let error_text = Paragraph::new(error.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Rgb(191, 97, 106)));
        f.render_widget(error_text, chunks[2]);
    }

    let switch = if form.sign_up {
        "Ctrl+N 切换到登录"
    } else {
        "Ctrl+N 切换到注册"
    };
    let help = Paragraph::new(format!("Tab 切换字段  Enter 提交  Esc 取消  {}", switch))
        .style(Style::default().fg(Color::Rgb(129, 161, 193)))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

/// 创建一个居中的矩形区域
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

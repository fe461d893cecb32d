use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::{CursorMove, TextArea};

/// 单行输入框，基于 tui-textarea
pub struct LineInput {
    textarea: TextArea<'static>,
    /// 只接受数字（天数输入）
    digits_only: bool,
    max_len: usize,
}

impl LineInput {
    pub fn new(placeholder: &str) -> Self {
        let mut textarea = TextArea::default();

        // Nord 主题
        textarea.set_style(
            Style::default()
                .fg(Color::Rgb(236, 239, 244))
                .bg(Color::Rgb(46, 52, 64)),
        );
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_text(placeholder);
        textarea.set_placeholder_style(Style::default().fg(Color::Rgb(76, 86, 106)));

        Self {
            textarea,
            digits_only: false,
            max_len: 120,
        }
    }

    /// 密码框
    pub fn masked(placeholder: &str) -> Self {
        let mut input = Self::new(placeholder);
        input.textarea.set_mask_char('•');
        input
    }

    pub fn numeric(placeholder: &str, max_len: usize) -> Self {
        let mut input = Self::new(placeholder);
        input.digits_only = true;
        input.max_len = max_len;
        input
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("")
    }

    pub fn set_value(&mut self, value: &str) {
        self.clear();
        self.textarea.insert_str(value);
    }

    pub fn clear(&mut self) {
        self.textarea.move_cursor(CursorMove::End);
        self.textarea.delete_line_by_head();
    }

    /// 处理按键，返回是否消费了该按键
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => {
                    self.textarea.delete_line_by_head();
                    true
                }
                KeyCode::Char('w') => {
                    self.textarea.delete_word();
                    true
                }
                _ => false,
            };
        }

        match key.code {
            KeyCode::Char(c) => {
                if self.digits_only && !c.is_ascii_digit() {
                    return true;
                }
                if self.value().chars().count() < self.max_len {
                    self.textarea.insert_char(c);
                }
                true
            }
            KeyCode::Backspace => {
                self.textarea.delete_char();
                true
            }
            KeyCode::Delete => {
                self.textarea.delete_next_char();
                true
            }
            KeyCode::Left => {
                self.textarea.move_cursor(CursorMove::Back);
                true
            }
            KeyCode::Right => {
                self.textarea.move_cursor(CursorMove::Forward);
                true
            }
            KeyCode::Home => {
                self.textarea.move_cursor(CursorMove::Head);
                true
            }
            KeyCode::End => {
                self.textarea.move_cursor(CursorMove::End);
                true
            }
            _ => false,
        }
    }

    /// 渲染带边框的输入框，聚焦时边框高亮并显示光标
    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str, focused: bool) {
        let border = if focused {
            Color::Rgb(136, 192, 208) // Nord cyan
        } else {
            Color::Rgb(76, 86, 106)
        };

        self.textarea.set_block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );

        let cursor = if focused {
            Style::default()
                .bg(Color::Rgb(136, 192, 208))
                .fg(Color::Rgb(46, 52, 64))
        } else {
            Style::default()
        };
        self.textarea.set_cursor_style(cursor);

        f.render_widget(&self.textarea, area);
    }
}

//! 侧边面板：新建 duty 表单 + 归档列表
use crossterm::event::{KeyCode, KeyEvent};

use super::text_input::LineInput;
use crate::models::duty::{DEFAULT_DURATION, ICONS};
use crate::models::{DutyColor, DutyDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTab {
    CreateNew,
    AddExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Icon,
    Color,
    Duration,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Name,
        FormField::Description,
        FormField::Icon,
        FormField::Color,
        FormField::Duration,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

pub struct CreatePanel {
    pub tab: PanelTab,
    pub field: FormField,
    pub name: LineInput,
    pub description: LineInput,
    pub icon: usize,
    pub color: usize,
    pub duration: LineInput,
    /// 归档列表中选中的行
    pub archive_selected: usize,
}

impl Default for CreatePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl CreatePanel {
    pub fn new() -> Self {
        Self {
            tab: PanelTab::CreateNew,
            field: FormField::Name,
            name: LineInput::new("e.g. Meditate"),
            description: LineInput::new("optional"),
            icon: 0,
            color: 0,
            duration: LineInput::numeric("66", 3).with_value(&DEFAULT_DURATION.to_string()),
            archive_selected: 0,
        }
    }

    /// 清空表单，保留当前标签页
    pub fn reset(&mut self) {
        let tab = self.tab;
        *self = Self::new();
        self.tab = tab;
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            PanelTab::CreateNew => PanelTab::AddExisting,
            PanelTab::AddExisting => PanelTab::CreateNew,
        };
    }

    pub fn draft(&self) -> DutyDraft {
        DutyDraft {
            name: self.name.value(),
            description: self.description.value(),
            icon: ICONS[self.icon % ICONS.len()].to_string(),
            color: DutyColor::ALL[self.color % DutyColor::ALL.len()],
            // 非法输入交给 validate 拒绝
            duration: self.duration.value().parse().unwrap_or(0),
        }
    }

    /// 名称为空时不允许提交
    pub fn can_submit(&self) -> bool {
        self.draft().validate().is_ok()
    }

    /// 表单内的按键：↑↓/Tab 切换字段，←→ 在图标和颜色上循环
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Tab => self.field = self.field.next(),
            KeyCode::Up | KeyCode::BackTab => self.field = self.field.prev(),
            KeyCode::Left | KeyCode::Right
                if matches!(self.field, FormField::Icon | FormField::Color) =>
            {
                let forward = key.code == KeyCode::Right;
                let (value, len) = match self.field {
                    FormField::Icon => (&mut self.icon, ICONS.len()),
                    _ => (&mut self.color, DutyColor::ALL.len()),
                };
                *value = if forward {
                    (*value + 1) % len
                } else {
                    (*value + len - 1) % len
                };
            }
            _ => {
                let input = match self.field {
                    FormField::Name => &mut self.name,
                    FormField::Description => &mut self.description,
                    FormField::Duration => &mut self.duration,
                    FormField::Icon | FormField::Color => return,
                };
                input.handle_key(key);
            }
        }
    }
}

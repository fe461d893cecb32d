use crate::app::{App, Mode, View};
use crate::input::Command;
use crate::ui::dialogs::DialogType;
use crate::ui::form::PanelTab;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// 处理键盘输入
/// 返回 false 表示应该退出应用
pub fn handle_key_input(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C 在任何模式下都退出
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Panel => handle_panel_mode(app, key),
        Mode::Dialog => handle_dialog_mode(app, key),
        Mode::Help => handle_help_mode(app, key),
    }
}

/// 正常模式下的按键映射
pub fn match_key(key: KeyEvent) -> Option<Command> {
    let cmd = match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('j') | KeyCode::Down => Command::DutyDown,
        KeyCode::Char('k') | KeyCode::Up => Command::DutyUp,
        KeyCode::Char('h') | KeyCode::Left => Command::DayLeft,
        KeyCode::Char('l') | KeyCode::Right => Command::DayRight,
        KeyCode::Char('K') => Command::WeekUp,
        KeyCode::Char('J') => Command::WeekDown,
        KeyCode::Char('[') => Command::PrevMonth,
        KeyCode::Char(']') => Command::NextMonth,
        KeyCode::Char('t') => Command::Today,
        KeyCode::Char(' ') | KeyCode::Enter => Command::ToggleDay,
        KeyCode::Char('n') => Command::NewDuty,
        KeyCode::Char('a') => Command::OpenArchive,
        KeyCode::Char('d') | KeyCode::Delete => Command::DeleteDuty,
        KeyCode::Char('r') => Command::Reload,
        KeyCode::Char('L') => Command::Account,
        KeyCode::Char('m') => Command::Migrate,
        KeyCode::Tab => Command::SwitchView,
        KeyCode::Char('?') => Command::ShowHelp,
        _ => return None,
    };
    Some(cmd)
}

/// 处理正常模式的按键
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> bool {
    let Some(cmd) = match_key(key) else {
        return true;
    };

    // 特殊处理退出命令
    if cmd == Command::Quit {
        return false;
    }

    execute_command(app, cmd);
    true
}

/// 执行命令
pub fn execute_command(app: &mut App, cmd: Command) {
    // 统计页只响应与视图无关的命令
    if app.view == View::Stats
        && !matches!(
            cmd,
            Command::SwitchView
                | Command::ShowHelp
                | Command::Account
                | Command::Migrate
                | Command::Reload
        )
    {
        return;
    }

    match cmd {
        Command::Quit => {}
        Command::DutyDown => app.select_next(),
        Command::DutyUp => app.select_prev(),
        Command::DayLeft => app.move_cursor(-1),
        Command::DayRight => app.move_cursor(1),
        Command::WeekUp => app.move_cursor(-7),
        Command::WeekDown => app.move_cursor(7),
        Command::PrevMonth => app.prev_month(),
        Command::NextMonth => app.next_month(),
        Command::Today => app.jump_to_today(),
        Command::ToggleDay => app.toggle_cursor_day(),
        Command::NewDuty => app.open_panel(PanelTab::CreateNew),
        Command::OpenArchive => app.open_panel(PanelTab::AddExisting),
        Command::DeleteDuty => app.request_delete(),
        Command::Reload => app.reload(),
        Command::Account => {
            if app.store.is_authenticated() {
                app.request_logout();
            } else {
                app.open_login();
            }
        }
        Command::Migrate => app.check_migration(),
        Command::SwitchView => app.switch_view(),
        Command::ShowHelp => app.mode = Mode::Help,
    }
}

/// 处理侧边面板的按键
fn handle_panel_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.close_panel();
            return true;
        }
        // Ctrl+T 切换 新建 / 归档 标签页
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.panel.switch_tab();
            return true;
        }
        _ => {}
    }

    match app.panel.tab {
        PanelTab::CreateNew => match key.code {
            KeyCode::Enter => app.submit_panel(),
            _ => app.panel.handle_key(key),
        },
        PanelTab::AddExisting => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.archive_next(),
            KeyCode::Char('k') | KeyCode::Up => app.archive_prev(),
            KeyCode::Enter | KeyCode::Char('r') => app.re_add_archived(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete_archived(),
            KeyCode::Tab => app.panel.switch_tab(),
            _ => {}
        },
    }
    true
}

/// 处理对话框模式的按键
fn handle_dialog_mode(app: &mut App, key: KeyEvent) -> bool {
    let Some(dialog) = &mut app.dialog else {
        app.mode = Mode::Normal;
        return true;
    };

    match dialog {
        DialogType::Confirm {
            yes_selected,
            action,
            dont_ask,
            ..
        } => match key.code {
            KeyCode::Esc | KeyCode::Char('n') => app.close_dialog(),
            KeyCode::Char('y') => {
                let (action, dont_ask) = (action.clone(), dont_ask.unwrap_or(false));
                app.close_dialog();
                app.apply_confirm(action, dont_ask);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Tab => {
                *yes_selected = !*yes_selected;
            }
            KeyCode::Char(' ') => {
                if let Some(checked) = dont_ask {
                    *checked = !*checked;
                }
            }
            KeyCode::Enter => {
                let confirmed = *yes_selected;
                let (action, dont_ask) = (action.clone(), dont_ask.unwrap_or(false));
                app.close_dialog();
                if confirmed {
                    app.apply_confirm(action, dont_ask);
                }
            }
            _ => {}
        },
        DialogType::Login(form) => match key.code {
            KeyCode::Esc => app.close_dialog(),
            KeyCode::Enter => {
                if form.field == crate::ui::dialogs::LoginField::Email {
                    form.toggle_field();
                } else {
                    app.submit_login();
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.sign_up = !form.sign_up;
                form.error = None;
            }
            _ => {
                form.focused_input().handle_key(key);
            }
        },
        DialogType::Migration { yes_selected, .. } => match key.code {
            KeyCode::Char('y') => app.answer_migration(true),
            KeyCode::Char('n') => app.answer_migration(false),
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Tab => {
                *yes_selected = !*yes_selected;
            }
            KeyCode::Enter => {
                let accept = *yes_selected;
                app.answer_migration(accept);
            }
            // 稍后再说：保持提示状态，下次启动或登录时再问
            KeyCode::Esc => app.close_dialog(),
            _ => {}
        },
    }
    true
}

/// 处理帮助模式的按键
fn handle_help_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
            app.mode = Mode::Normal;
        }
        _ => {}
    }
    true
}

use chrono::{Datelike, Duration, NaiveDate};
use std::time::Instant;

use crate::calendar::{self, Month};
use crate::migration::{Migration, MigrationState};
use crate::models::Duty;
use crate::remote::AuthProvider;
use crate::services::Services;
use crate::store::{Backend, DutyStore};
use crate::ui::dialogs::{ConfirmAction, DialogType, LoginForm};
use crate::ui::form::{CreatePanel, PanelTab};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 通知消息
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
}

impl Notification {
    /// 检查通知是否已过期（3秒后自动消失）
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= 3
    }
}

/// 应用模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 正常模式 - 浏览 duty 和日历
    Normal,
    /// 侧边面板（新建 / 归档）
    Panel,
    /// 对话框模式
    Dialog,
    /// 帮助模式 - 显示快捷键
    Help,
}

/// 顶部导航的标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Duties,
    Stats,
}

/// 应用状态
pub struct App {
    pub store: DutyStore,
    pub auth: Option<Box<dyn AuthProvider>>,
    pub migration: Migration,
    pub mode: Mode,
    pub view: View,
    /// 选中的 duty 下标
    pub selected: usize,
    /// 日历当前显示的月份
    pub month: Month,
    /// 日历光标所在日期
    pub cursor: NaiveDate,
    pub panel: CreatePanel,
    /// 当前显示的对话框
    pub dialog: Option<DialogType>,
    /// 对话框关闭后回到的模式
    return_mode: Mode,
    /// 通知消息
    pub notification: Option<Notification>,
}

impl App {
    /// 创建新的应用实例
    pub fn new(services: Services) -> Self {
        let today = services.store.today();
        let mut app = Self {
            store: services.store,
            auth: services.auth,
            migration: Migration::new(),
            mode: Mode::Normal,
            view: View::Duties,
            selected: 0,
            month: Month::of(today),
            cursor: today,
            panel: CreatePanel::new(),
            dialog: None,
            return_mode: Mode::Normal,
            notification: None,
        };

        // 启动时已经登录的话也要检查迁移
        app.check_migration();
        app
    }

    pub fn today(&self) -> NaiveDate {
        self.store.today()
    }

    pub fn selected_duty(&self) -> Option<&Duty> {
        self.store.duties().get(self.selected)
    }

    // ===== 导航 =====

    pub fn select_next(&mut self) {
        let len = self.store.duties().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.store.duties().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// 删除或重新加载后保证下标有效
    fn clamp_selection(&mut self) {
        let len = self.store.duties().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// 光标移动若干天，跨月时日历跟着翻页
    pub fn move_cursor(&mut self, days: i64) {
        if let Some(date) = self.cursor.checked_add_signed(Duration::days(days)) {
            self.cursor = date;
            self.month = Month::of(date);
        }
    }

    pub fn next_month(&mut self) {
        self.set_month(self.month.next());
    }

    pub fn prev_month(&mut self) {
        self.set_month(self.month.prev());
    }

    /// 翻页时光标停在同一天（月末截断）
    fn set_month(&mut self, month: Month) {
        let day = self.cursor.day().min(month.days_in_month());
        self.month = month;
        if let Some(date) = NaiveDate::from_ymd_opt(month.year, month.month, day) {
            self.cursor = date;
        }
    }

    pub fn jump_to_today(&mut self) {
        self.cursor = self.today();
        self.month = Month::of(self.cursor);
    }

    pub fn switch_view(&mut self) {
        self.view = match self.view {
            View::Duties => View::Stats,
            View::Stats => View::Duties,
        };
    }

    // ===== 标记完成 =====

    /// 切换光标所在日期。未来日期和创建日之前的日期不可操作；
    /// 7 天以前的日期需要确认（除非用户选择了不再提示）。
    pub fn toggle_cursor_day(&mut self) {
        let Some(duty) = self.selected_duty() else {
            return;
        };
        let (duty_id, start) = (duty.id, duty.start_date());
        let date = self.cursor;
        let today = self.today();

        if !calendar::in_tracked_range(date, start, today) {
            return;
        }

        if calendar::needs_confirmation(date, today) && !self.store.dont_warn_old_date() {
            self.open_dialog(DialogType::Confirm {
                title: "修改旧日期".to_string(),
                message: format!("{} 已经是一周以前了，确定要修改吗？", date.format("%Y-%m-%d")),
                yes_selected: true,
                action: ConfirmAction::ToggleOldDate { duty_id, date },
                dont_ask: Some(false),
            });
            return;
        }

        self.store.toggle_day(duty_id, date);
    }

    // ===== 新建 / 归档面板 =====

    pub fn open_panel(&mut self, tab: PanelTab) {
        self.panel.tab = tab;
        self.panel.archive_selected = 0;
        self.mode = Mode::Panel;
    }

    pub fn close_panel(&mut self) {
        self.mode = Mode::Normal;
    }

    /// 提交新建表单；名称为空时静默拒绝
    pub fn submit_panel(&mut self) {
        if !self.panel.can_submit() {
            return;
        }

        match self.store.create(self.panel.draft()) {
            Ok(id) => {
                let name = self
                    .store
                    .find(id)
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                self.selected = self
                    .store
                    .duties()
                    .iter()
                    .position(|d| d.id == id)
                    .unwrap_or(self.selected);
                self.panel.reset();
                self.mode = Mode::Normal;
                self.show_notification(format!("已创建 {}", name), NotificationLevel::Success);
            }
            Err(e) => {
                tracing::debug!(error = %e, "create refused");
            }
        }
    }

    pub fn archive_next(&mut self) {
        let len = self.store.archive().len();
        if len > 0 {
            self.panel.archive_selected = (self.panel.archive_selected + 1) % len;
        }
    }

    pub fn archive_prev(&mut self) {
        let len = self.store.archive().len();
        if len > 0 {
            self.panel.archive_selected = (self.panel.archive_selected + len - 1) % len;
        }
    }

    fn selected_archived_id(&self) -> Option<i64> {
        self.store
            .archive()
            .items()
            .get(self.panel.archive_selected)
            .map(|d| d.id)
    }

    /// 归档 → 当前列表
    pub fn re_add_archived(&mut self) {
        let Some(id) = self.selected_archived_id() else {
            return;
        };
        if let Some(new_id) = self.store.re_add(id) {
            if let Some(pos) = self.store.duties().iter().position(|d| d.id == new_id) {
                self.selected = pos;
            }
            self.clamp_archive_selection();
            self.show_notification("已恢复".to_string(), NotificationLevel::Success);
        } else {
            self.show_notification("恢复失败，duty 仍在归档中".to_string(), NotificationLevel::Error);
        }
    }

    pub fn request_delete_archived(&mut self) {
        let Some(id) = self.selected_archived_id() else {
            return;
        };
        self.confirm(
            "永久删除",
            "从归档中永久删除？此操作无法撤销。",
            ConfirmAction::DeleteArchived(id),
        );
    }

    fn clamp_archive_selection(&mut self) {
        let len = self.store.archive().len();
        if self.panel.archive_selected >= len {
            self.panel.archive_selected = len.saturating_sub(1);
        }
    }

    pub fn request_delete(&mut self) {
        let Some(duty) = self.selected_duty() else {
            return;
        };
        let message = format!("删除 \"{}\"？它会被移到归档中，可以随时恢复。", duty.name);
        let action = ConfirmAction::DeleteDuty(duty.id);
        self.confirm("删除 duty", &message, action);
    }

    // ===== 对话框 =====

    fn confirm(&mut self, title: &str, message: &str, action: ConfirmAction) {
        self.open_dialog(DialogType::Confirm {
            title: title.to_string(),
            message: message.to_string(),
            yes_selected: false,
            action,
            dont_ask: None,
        });
    }

    fn open_dialog(&mut self, dialog: DialogType) {
        if self.mode != Mode::Dialog {
            self.return_mode = self.mode;
        }
        self.dialog = Some(dialog);
        self.mode = Mode::Dialog;
    }

    /// 关闭对话框，回到打开前的模式
    pub fn close_dialog(&mut self) {
        self.dialog = None;
        self.mode = self.return_mode;
    }

    /// 对话框是从侧边面板打开的（面板仍需显示）
    pub fn return_to_panel(&self) -> bool {
        self.mode == Mode::Dialog && self.return_mode == Mode::Panel
    }

    /// 执行确认对话框的操作
    pub fn apply_confirm(&mut self, action: ConfirmAction, dont_ask: bool) {
        match action {
            ConfirmAction::ToggleOldDate { duty_id, date } => {
                if dont_ask {
                    self.store.set_dont_warn_old_date(true);
                }
                self.store.toggle_day(duty_id, date);
            }
            ConfirmAction::DeleteDuty(id) => {
                if self.store.delete(id) {
                    self.clamp_selection();
                    self.show_notification("已移到归档".to_string(), NotificationLevel::Info);
                }
            }
            ConfirmAction::DeleteArchived(id) => {
                if self.store.delete_archived(id) {
                    self.clamp_archive_selection();
                }
            }
            ConfirmAction::Logout => self.logout(),
        }
    }

    // ===== 登录 / 迁移 =====

    pub fn is_remote_configured(&self) -> bool {
        self.auth.is_some()
    }

    pub fn open_login(&mut self) {
        if !self.is_remote_configured() {
            self.show_notification(
                "未配置远端服务，运行 dtk config remote <url> <anon-key>".to_string(),
                NotificationLevel::Warning,
            );
            return;
        }
        self.open_dialog(DialogType::Login(LoginForm::new()));
    }

    pub fn request_logout(&mut self) {
        let name = self
            .store
            .session()
            .map(|s| s.display_name().to_string())
            .unwrap_or_default();
        self.confirm("退出登录", &format!("退出 {}？", name), ConfirmAction::Logout);
    }

    /// 提交登录表单；失败时错误显示在表单内
    pub fn submit_login(&mut self) {
        let Some(DialogType::Login(form)) = &mut self.dialog else {
            return;
        };
        if !form.is_complete() {
            return;
        }
        let Some(auth) = &self.auth else {
            return;
        };

        let email = form.email.value().trim().to_string();
        let password = form.password.value();
        let result = if form.sign_up {
            auth.sign_up(&email, &password)
        } else {
            auth.sign_in(&email, &password).map(Some)
        };

        match result {
            Ok(Some(session)) => {
                tracing::info!(user = %session.user_id(), "signed in");
                let name = session.display_name().to_string();
                self.close_dialog();
                self.store.set_session(Some(session));
                self.after_reload();
                self.show_notification(format!("已登录 {}", name), NotificationLevel::Success);
                self.check_migration();
            }
            Ok(None) => {
                self.close_dialog();
                self.show_notification(
                    "注册成功，请查收确认邮件后登录".to_string(),
                    NotificationLevel::Info,
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "authentication failed");
                form.error = Some(e.to_string());
            }
        }
    }

    pub fn logout(&mut self) {
        if let (Some(auth), Some(session)) = (&self.auth, self.store.session()) {
            if let Err(e) = auth.sign_out(session) {
                tracing::warn!(error = %e, "remote sign-out failed");
            }
        }
        self.store.set_session(None);
        self.after_reload();
        self.show_notification("已退出登录".to_string(), NotificationLevel::Info);
    }

    /// 需要迁移时弹出提示
    pub fn check_migration(&mut self) {
        if self.migration.evaluate(&self.store) == MigrationState::Prompting {
            let count = self.store.local().raw_duties().len();
            self.open_dialog(DialogType::Migration {
                count,
                yes_selected: true,
            });
        }
    }

    pub fn answer_migration(&mut self, accept: bool) {
        self.close_dialog();

        if !accept {
            self.migration.decline(&mut self.store);
            return;
        }

        match self.migration.accept(&mut self.store) {
            Ok(count) => {
                self.after_reload();
                self.show_notification(
                    format!("已迁移 {} 个 duty", count),
                    NotificationLevel::Success,
                );
            }
            Err(e) => {
                self.show_notification(format!("迁移失败: {}", e), NotificationLevel::Error);
            }
        }
    }

    pub fn reload(&mut self) {
        self.store.load();
        self.after_reload();
    }

    fn after_reload(&mut self) {
        self.clamp_selection();
        self.clamp_archive_selection();
    }

    pub fn backend_label(&self) -> String {
        match (self.store.backend(), self.store.session()) {
            (Backend::Remote, Some(session)) => session.display_name().to_string(),
            _ => "本地".to_string(),
        }
    }

    /// 显示通知消息
    pub fn show_notification(&mut self, message: String, level: NotificationLevel) {
        self.notification = Some(Notification {
            message,
            level,
            created_at: Instant::now(),
        });
    }

    /// 清除已过期的通知
    pub fn clear_expired_notification(&mut self) {
        if let Some(ref notification) = self.notification {
            if notification.is_expired() {
                self.notification = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::remote::memory::{session_for, MemoryAuth, MemoryTable};
    use crate::remote::DutyTable;
    use crate::storage::{keys, KeyValueStore, LocalPersistence, MemoryStore};
    use crate::store::sample_duties;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    fn local_with(entries: &[(&str, &str)]) -> LocalPersistence {
        let mut store = MemoryStore::default();
        for (k, v) in entries {
            store.set(k, v).unwrap();
        }
        LocalPersistence::new(Box::new(store))
    }

    fn app_with(local: LocalPersistence, table: Option<&MemoryTable>) -> App {
        let remote = table.map(|t| Box::new(t.clone()) as Box<dyn DutyTable>);
        let mut store = DutyStore::new(local, remote, Box::new(FixedClock::on(today())));
        store.load();
        let auth = table.map(|_| Box::new(MemoryAuth) as Box<dyn AuthProvider>);
        App::new(Services { store, auth })
    }

    fn confirm_action(app: &App) -> ConfirmAction {
        match &app.dialog {
            Some(DialogType::Confirm { action, .. }) => action.clone(),
            _ => panic!("expected confirm dialog"),
        }
    }

    /// 本地模式，使用示例数据（两个 duty，创建于两周前）
    fn sample_app() -> App {
        app_with(local_with(&[]), None)
    }

    #[test]
    fn test_future_day_is_refused() {
        let mut app = sample_app();
        app.move_cursor(1);
        app.toggle_cursor_day();

        let duty = app.selected_duty().unwrap();
        assert!(!duty.is_completed(today() + Duration::days(1)));
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_recent_day_toggles_directly() {
        let mut app = sample_app();
        app.toggle_cursor_day();

        assert!(app.selected_duty().unwrap().is_completed(today()));
        assert!(app.dialog.is_none());
        // 第一次修改后示例数据被写入
        assert!(app.store.local().load_duties(app.store.now()).is_some());
    }

    #[test]
    fn test_old_day_asks_for_confirmation() {
        let mut app = sample_app();
        let old = today() - Duration::days(10);
        app.move_cursor(-10);
        let before = app.selected_duty().unwrap().is_completed(old);

        app.toggle_cursor_day();
        assert_eq!(app.mode, Mode::Dialog);
        let action = confirm_action(&app);
        assert_eq!(app.selected_duty().unwrap().is_completed(old), before);

        app.close_dialog();
        app.apply_confirm(action, true);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.selected_duty().unwrap().is_completed(old), !before);
        assert!(app.store.dont_warn_old_date());

        // 不再提示
        app.toggle_cursor_day();
        assert!(app.dialog.is_none());
        assert_eq!(app.selected_duty().unwrap().is_completed(old), before);
    }

    #[test]
    fn test_delete_moves_to_archive() {
        let mut app = sample_app();
        app.select_prev();
        assert_eq!(app.selected, 1);

        app.request_delete();
        let action = confirm_action(&app);
        app.close_dialog();
        app.apply_confirm(action, false);

        assert_eq!(app.store.duties().len(), 1);
        assert_eq!(app.store.archive().len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_dialog_from_panel_returns_to_panel() {
        let mut app = sample_app();
        app.request_delete();
        let action = confirm_action(&app);
        app.close_dialog();
        app.apply_confirm(action, false);

        app.open_panel(PanelTab::AddExisting);
        app.request_delete_archived();
        assert!(app.return_to_panel());
        app.close_dialog();
        assert_eq!(app.mode, Mode::Panel);
    }

    #[test]
    fn test_submit_panel() {
        let mut app = sample_app();
        app.open_panel(PanelTab::CreateNew);

        // 名称为空：静默拒绝
        app.submit_panel();
        assert_eq!(app.mode, Mode::Panel);
        assert_eq!(app.store.duties().len(), 2);

        app.panel.name.set_value("Meditate");
        app.submit_panel();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.store.duties().len(), 3);
        assert_eq!(app.selected_duty().unwrap().name, "Meditate");
        assert_eq!(app.panel.name.value(), "");
    }

    #[test]
    fn test_month_navigation_clamps_day() {
        let mut app = sample_app();
        app.move_cursor(11); // 2024-01-31
        app.next_month();
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        app.jump_to_today();
        assert_eq!(app.cursor, today());
        assert_eq!(app.month, Month::of(today()));
    }

    #[test]
    fn test_login_requires_remote_config() {
        let mut app = sample_app();
        app.open_login();
        assert!(app.dialog.is_none());
        assert_eq!(
            app.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_login_then_migrate() {
        let table = MemoryTable::new();
        let now = FixedClock::on(today()).now;
        let duties = serde_json::to_string(&sample_duties(now, today())).unwrap();
        let mut app = app_with(local_with(&[(keys::DUTIES, duties.as_str())]), Some(&table));
        assert_eq!(app.store.backend(), Backend::Local);

        app.open_login();
        if let Some(DialogType::Login(form)) = &mut app.dialog {
            form.email.set_value("alice@example.com");
            form.password.set_value("secret");
        }
        app.submit_login();

        assert_eq!(app.store.backend(), Backend::Remote);
        assert!(matches!(
            app.dialog,
            Some(DialogType::Migration { count: 2, .. })
        ));

        app.answer_migration(true);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.migration.state(), MigrationState::Done);
        assert_eq!(table.rows_for("alice").len(), 2);
        assert_eq!(app.store.duties().len(), 2);
    }

    #[test]
    fn test_startup_with_session_prompts_migration() {
        let table = MemoryTable::new();
        let walk = r#"[{"id":1,"name":"Walk","createdAt":"2024-01-01T00:00:00Z"}]"#;
        let mut local = local_with(&[(keys::DUTIES, walk)]);
        crate::remote::save_session(&mut local, &session_for("bob")).unwrap();

        let mut app = app_with(local, Some(&table));
        assert!(app.migration.is_prompting());
        assert_eq!(app.mode, Mode::Dialog);

        // 关闭提示不算拒绝，之后还能重新打开
        app.close_dialog();
        assert!(app.migration.is_prompting());
        app.check_migration();
        assert_eq!(app.mode, Mode::Dialog);

        app.answer_migration(false);
        assert!(app.store.local().has_migrated());
        assert!(table.rows_for("bob").is_empty());
    }
}

//! One-shot transfer of locally stored duties into the remote table.
//!
//! ```text
//! Idle ──(signed in, flag absent, local list non-empty)──> Prompting
//! Prompting ──accept──> Migrating ──insert ok──> Done
//!                           └──insert failed──> Prompting
//! Prompting ──decline──> Done
//! ```
//!
//! `Done` is backed by a sticky local flag, so the prompt never comes back
//! once the user has answered it, whatever local data shows up later.

use crate::error::{Result, StoreError};
use crate::models::DutyRow;
use crate::store::{Backend, DutyStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Idle,
    Prompting,
    Migrating,
    Done,
}

#[derive(Debug)]
pub struct Migration {
    state: MigrationState,
}

impl Default for Migration {
    fn default() -> Self {
        Self::new()
    }
}

impl Migration {
    pub fn new() -> Self {
        Self {
            state: MigrationState::Idle,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn is_prompting(&self) -> bool {
        self.state == MigrationState::Prompting
    }

    /// 登录状态变化后调用，判断是否需要弹出迁移提示
    pub fn evaluate(&mut self, store: &DutyStore) -> MigrationState {
        if matches!(self.state, MigrationState::Done | MigrationState::Migrating) {
            return self.state;
        }

        self.state = if store.local().has_migrated() {
            MigrationState::Done
        } else if store.backend() == Backend::Remote && !store.local().raw_duties().is_empty() {
            MigrationState::Prompting
        } else {
            MigrationState::Idle
        };

        self.state
    }

    /// 用户同意迁移：批量插入远端，设置标记，清空本地，重新从远端加载。
    /// 返回迁移的条数；不在提示状态时什么都不做。
    pub fn accept(&mut self, store: &mut DutyStore) -> Result<usize> {
        if self.state != MigrationState::Prompting {
            return Ok(0);
        }
        self.state = MigrationState::Migrating;

        let Some(user_id) = store.session().map(|s| s.user_id().to_string()) else {
            self.state = MigrationState::Idle;
            return Err(StoreError::NotAuthenticated);
        };

        let now = store.now();
        let rows: Vec<DutyRow> = store
            .local()
            .raw_duties()
            .iter()
            .map(|value| DutyRow::from_local_value(value, &user_id, now))
            .collect();

        let migrated = if rows.is_empty() {
            0
        } else {
            let result = store
                .with_remote(|table, session| table.insert(session, &rows))
                .unwrap_or(Err(StoreError::RemoteNotConfigured));

            match result {
                Ok(inserted) => inserted.len(),
                Err(e) => {
                    tracing::warn!(error = %e, "migration insert failed, keeping local data");
                    self.state = MigrationState::Prompting;
                    return Err(e);
                }
            }
        };

        if let Err(e) = store.local_mut().mark_migrated() {
            tracing::error!(error = %e, "failed to persist migration flag");
        }
        if let Err(e) = store.local_mut().clear_duties() {
            tracing::error!(error = %e, "failed to clear local duties after migration");
        }
        store.load();

        tracing::info!(migrated, "local duties migrated");
        self.state = MigrationState::Done;
        Ok(migrated)
    }

    /// 用户拒绝：只设置标记，不转移数据
    pub fn decline(&mut self, store: &mut DutyStore) {
        if let Err(e) = store.local_mut().mark_migrated() {
            tracing::error!(error = %e, "failed to persist migration flag");
        }
        tracing::info!("migration declined");
        self.state = MigrationState::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::remote::memory::{session_for, MemoryTable};
    use crate::storage::{keys, FileStore, KeyValueStore, LocalPersistence};
    use chrono::NaiveDate;
    use std::path::Path;

    const LOCAL_DUTIES: &str = r#"[
        {
            "id": 1700000000000,
            "name": "Meditate",
            "description": "",
            "icon": "🧘‍♀️",
            "color": "purple",
            "duration": 66,
            "completedDays": ["2024-01-15"],
            "createdAt": "2024-01-10T08:00:00.000Z"
        },
        { "id": 1700000000001, "name": "Half-written", "duration": "?", "color": 3 }
    ]"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    fn seed(dir: &Path, signed_in: bool) {
        let mut files = FileStore::new(dir);
        files.set(keys::DUTIES, LOCAL_DUTIES).unwrap();
        if signed_in {
            let session = serde_json::to_string(&session_for("alice")).unwrap();
            files.set(keys::SESSION, &session).unwrap();
        }
    }

    fn open(dir: &Path, table: &MemoryTable) -> DutyStore {
        let mut store = DutyStore::new(
            LocalPersistence::new(Box::new(FileStore::new(dir))),
            Some(Box::new(table.clone())),
            Box::new(FixedClock::on(today())),
        );
        store.load();
        store
    }

    #[test]
    fn test_idle_when_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), false);
        let table = MemoryTable::new();
        let store = open(dir.path(), &table);

        let mut migration = Migration::new();
        assert_eq!(migration.evaluate(&store), MigrationState::Idle);
    }

    #[test]
    fn test_idle_without_local_data() {
        let dir = tempfile::tempdir().unwrap();
        let table = MemoryTable::new();
        let mut store = open(dir.path(), &table);
        store.set_session(Some(session_for("alice")));

        let mut migration = Migration::new();
        assert_eq!(migration.evaluate(&store), MigrationState::Idle);
        assert_eq!(migration.accept(&mut store).unwrap(), 0);
    }

    #[test]
    fn test_accept_moves_local_duties_to_remote() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), true);
        let table = MemoryTable::new();
        let mut store = open(dir.path(), &table);

        let mut migration = Migration::new();
        assert_eq!(migration.evaluate(&store), MigrationState::Prompting);
        assert_eq!(migration.accept(&mut store).unwrap(), 2);
        assert_eq!(migration.state(), MigrationState::Done);

        let rows = table.rows_for("alice");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].completed_days, Some(vec!["2024-01-15".to_string()]));
        // 缺失或非法字段补默认值
        assert_eq!(rows[1].icon.as_deref(), Some("📝"));
        assert_eq!(rows[1].duration, Some(66));
        assert_eq!(rows[1].color.as_deref(), Some("blue"));
        assert_eq!(rows[1].created_at, Some(store.now().to_rfc3339()));

        assert!(store.local().has_migrated());
        assert!(store.local().load_duties(store.now()).is_none());
        // 当前列表来自远端
        assert_eq!(store.duties().len(), 2);
        assert_eq!(store.duties()[0].name, "Meditate");
    }

    #[test]
    fn test_migration_runs_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), true);
        let table = MemoryTable::new();

        let mut store = open(dir.path(), &table);
        let mut migration = Migration::new();
        migration.evaluate(&store);
        migration.accept(&mut store).unwrap();
        drop(store);

        // 本地残留了旧数据，再次启动也不应重新提示或重复插入
        FileStore::new(dir.path()).set(keys::DUTIES, LOCAL_DUTIES).unwrap();

        let mut store = open(dir.path(), &table);
        let mut migration = Migration::new();
        assert_eq!(migration.evaluate(&store), MigrationState::Done);
        assert_eq!(migration.accept(&mut store).unwrap(), 0);
        assert_eq!(table.rows_for("alice").len(), 2);
    }

    #[test]
    fn test_decline_sets_flag_without_transfer() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), true);
        let table = MemoryTable::new();
        let mut store = open(dir.path(), &table);

        let mut migration = Migration::new();
        migration.evaluate(&store);
        migration.decline(&mut store);

        assert_eq!(migration.state(), MigrationState::Done);
        assert!(table.rows_for("alice").is_empty());
        assert!(store.local().has_migrated());
        assert_eq!(store.local().raw_duties().len(), 2);

        let store = open(dir.path(), &table);
        assert_eq!(Migration::new().evaluate(&store), MigrationState::Done);
    }

    #[test]
    fn test_failed_insert_returns_to_prompting() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), true);
        let table = MemoryTable::new();
        let mut store = open(dir.path(), &table);

        let mut migration = Migration::new();
        migration.evaluate(&store);
        table.failing.set(true);

        assert!(migration.accept(&mut store).is_err());
        assert_eq!(migration.state(), MigrationState::Prompting);
        assert!(!store.local().has_migrated());
        assert_eq!(store.local().raw_duties().len(), 2);

        table.failing.set(false);
        assert_eq!(migration.accept(&mut store).unwrap(), 2);
    }
}

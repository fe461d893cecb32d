//! Duty entity store: the only owner of the in-memory duty list.
//!
//! Every mutation updates the list first and then writes through to the
//! active backend: the local JSON blobs when signed out, the remote `duties`
//! table when signed in. Remote writes are optimistic; a failed call is
//! logged and the in-memory change stays.

mod archive;
mod samples;

pub use archive::ArchiveStore;
pub use samples::sample_duties;

use chrono::{DateTime, NaiveDate, Utc};

use crate::clock::Clock;
use crate::error::{Result, StoreError};
use crate::models::remote::format_days;
use crate::models::{Duty, DutyDraft, DutyRow};
use crate::remote::{self, DutyTable, Session};
use crate::storage::LocalPersistence;

/// 当前生效的持久化后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Remote,
}

pub struct DutyStore {
    local: LocalPersistence,
    remote: Option<Box<dyn DutyTable>>,
    session: Option<Session>,
    clock: Box<dyn Clock>,
    duties: Vec<Duty>,
    archive: ArchiveStore,
}

impl DutyStore {
    /// 创建 store；会话从本地读取，调用方随后需要 `load()`
    pub fn new(
        local: LocalPersistence,
        remote: Option<Box<dyn DutyTable>>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let session = remote::current_session(&local);
        Self {
            local,
            remote,
            session,
            clock,
            duties: Vec::new(),
            archive: ArchiveStore::default(),
        }
    }

    pub fn backend(&self) -> Backend {
        if self.remote.is_some() && self.session.is_some() {
            Backend::Remote
        } else {
            Backend::Local
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn duties(&self) -> &[Duty] {
        &self.duties
    }

    pub fn find(&self, id: i64) -> Option<&Duty> {
        self.duties.iter().find(|d| d.id == id)
    }

    pub fn archive(&self) -> &ArchiveStore {
        &self.archive
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn local(&self) -> &LocalPersistence {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut LocalPersistence {
        &mut self.local
    }

    /// 编辑旧日期时是否跳过确认
    pub fn dont_warn_old_date(&self) -> bool {
        self.local.dont_warn_old_date()
    }

    pub fn set_dont_warn_old_date(&mut self, value: bool) {
        if let Err(e) = self.local.set_dont_warn_old_date(value) {
            tracing::warn!(error = %e, "failed to save warning preference");
        }
    }

    /// 切换登录状态：保存或清除会话，然后重新加载
    pub fn set_session(&mut self, session: Option<Session>) {
        let saved = match &session {
            Some(s) => remote::save_session(&mut self.local, s),
            None => remote::clear_session(&mut self.local),
        };
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to persist session");
        }

        self.session = session;
        self.load();
    }

    /// 在远端模式下执行一次远端调用；本地模式返回 None
    pub fn with_remote<T>(
        &self,
        f: impl FnOnce(&dyn DutyTable, &Session) -> Result<T>,
    ) -> Option<Result<T>> {
        match (&self.remote, &self.session) {
            (Some(table), Some(session)) => Some(f(table.as_ref(), session)),
            _ => None,
        }
    }

    /// Hydrate the active list from the current backend and the archive from
    /// local storage. Never fails; problems are logged and degrade to an
    /// empty (remote) or fallback (local) list.
    pub fn load(&mut self) {
        let now = self.clock.now();
        self.archive = ArchiveStore::new(self.local.load_archive(now));

        let loaded = match self.with_remote(|table, session| table.fetch_for_user(session)) {
            Some(Ok(rows)) => rows.iter().filter_map(|row| row.to_duty(now)).collect(),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "failed to fetch duties from remote");
                Vec::new()
            }
            None => self.load_local(),
        };

        tracing::info!(count = loaded.len(), backend = ?self.backend(), "duties loaded");
        self.duties = loaded;
    }

    /// 本地列表 → 旧版清单 → 示例数据
    fn load_local(&mut self) -> Vec<Duty> {
        let now = self.clock.now();
        let today = self.clock.today();

        if let Some(duties) = self.local.load_duties(now) {
            return duties;
        }

        if let Some(items) = self.local.load_legacy_checklist() {
            let duties: Vec<Duty> = items
                .into_iter()
                .filter_map(|item| item.into_duty(now, today))
                .collect();
            if !duties.is_empty() {
                tracing::info!(count = duties.len(), "imported legacy checklist");
                if let Err(e) = self.local.save_duties(&duties) {
                    tracing::warn!(error = %e, "failed to save imported checklist");
                }
                return duties;
            }
        }

        sample_duties(now, today)
    }

    /// Create a duty from a validated draft and return its id.
    ///
    /// In remote mode the id is the database-assigned one when the insert
    /// succeeds, otherwise the temporary local id.
    pub fn create(&mut self, draft: DutyDraft) -> Result<i64> {
        draft.validate().map_err(StoreError::InvalidDraft)?;

        let id = self.next_local_id();
        let duty = draft.into_duty(id, self.clock.now());
        self.duties.push(duty.clone());

        match self.insert_remote(&duty) {
            Some(assigned) => Ok(assigned),
            None => {
                if self.backend() == Backend::Local {
                    self.persist_duties();
                }
                Ok(id)
            }
        }
    }

    /// Flip `date` in the duty's completed set and persist the new set.
    /// Unknown ids are a no-op and return `None`.
    pub fn toggle_day(&mut self, duty_id: i64, date: NaiveDate) -> Option<bool> {
        let duty = self.duties.iter_mut().find(|d| d.id == duty_id)?;
        let completed = duty.toggle(date);
        let days = format_days(&duty.completed_days);

        match self.with_remote(|table, session| table.update_completed_days(session, duty_id, &days)) {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                tracing::warn!(duty_id, error = %e, "failed to update completed days remotely");
            }
            None => self.persist_duties(),
        }

        tracing::debug!(duty_id, %date, completed, "toggled day");
        Some(completed)
    }

    /// Move a duty from the active list into the archive.
    ///
    /// Archiving always happens locally; in remote mode the row delete is
    /// fire-and-forget and not rolled back on failure.
    pub fn delete(&mut self, duty_id: i64) -> bool {
        let Some(pos) = self.duties.iter().position(|d| d.id == duty_id) else {
            return false;
        };

        let duty = self.duties.remove(pos);
        self.archive.push(duty);
        self.persist_archive();

        match self.with_remote(|table, session| table.delete(session, duty_id)) {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                tracing::warn!(duty_id, error = %e, "remote delete failed, duty stays archived locally");
            }
            None => self.persist_duties(),
        }

        true
    }

    /// 从归档恢复到当前列表，返回恢复后的 id。
    ///
    /// In remote mode the row is inserted first; if that fails the duty stays
    /// in the archive and `None` is returned, since nothing else would keep it.
    pub fn re_add(&mut self, archived_id: i64) -> Option<i64> {
        let duty = self.archive.get(archived_id)?.clone();

        let id = match self.with_remote(|table, session| {
            table.insert(session, &[DutyRow::from_duty(&duty, session.user_id())])
        }) {
            Some(Ok(rows)) => rows.first().and_then(|row| row.id).unwrap_or(archived_id),
            Some(Err(e)) => {
                tracing::warn!(name = %duty.name, error = %e, "remote insert failed, duty stays archived");
                return None;
            }
            None => archived_id,
        };

        self.archive.take(archived_id);
        self.persist_archive();
        self.duties.push(Duty { id, ..duty });
        if self.backend() == Backend::Local {
            self.persist_duties();
        }
        Some(id)
    }

    /// 从归档中永久删除
    pub fn delete_archived(&mut self, archived_id: i64) -> bool {
        if !self.archive.remove(archived_id) {
            return false;
        }
        self.persist_archive();
        true
    }

    /// 远端插入一条 duty，成功时把内存中的临时 id 换成数据库分配的 id。
    /// 本地模式或插入失败时返回 None。
    fn insert_remote(&mut self, duty: &Duty) -> Option<i64> {
        let result = self.with_remote(|table, session| {
            table.insert(session, &[DutyRow::from_duty(duty, session.user_id())])
        })?;

        match result {
            Ok(rows) => {
                let assigned = rows.first().and_then(|row| row.id)?;
                if let Some(entry) = self.duties.iter_mut().find(|d| d.id == duty.id) {
                    entry.id = assigned;
                }
                Some(assigned)
            }
            Err(e) => {
                tracing::warn!(name = %duty.name, error = %e, "remote insert failed");
                None
            }
        }
    }

    /// 时间戳 id，保证比已有的都大
    fn next_local_id(&self) -> i64 {
        let max_known = self
            .duties
            .iter()
            .chain(self.archive.items())
            .map(|d| d.id)
            .max()
            .unwrap_or(0);
        self.clock.now().timestamp_millis().max(max_known + 1)
    }

    fn persist_duties(&mut self) {
        if let Err(e) = self.local.save_duties(&self.duties) {
            tracing::warn!(error = %e, "failed to save duties");
        }
    }

    fn persist_archive(&mut self) {
        if let Err(e) = self.local.save_archive(self.archive.items()) {
            tracing::warn!(error = %e, "failed to save archive");
        }
    }
}

#[cfg(test)]
mod tests;

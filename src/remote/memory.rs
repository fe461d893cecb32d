//! 内存中的远端替身，测试用
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{AuthProvider, DutyTable, Session, User};
use crate::error::{Result, StoreError};
use crate::models::DutyRow;

/// In-memory `duties` table. Cloning shares the same rows, so a test can keep
/// a handle while the store owns another.
#[derive(Clone, Default)]
pub struct MemoryTable {
    pub rows: Rc<RefCell<Vec<DutyRow>>>,
    next_id: Rc<Cell<i64>>,
    /// 置为 true 后所有调用返回错误
    pub failing: Rc<Cell<bool>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        let table = Self::default();
        table.next_id.set(100);
        table
    }

    pub fn rows_for(&self, user_id: &str) -> Vec<DutyRow> {
        self.rows
            .borrow()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    fn check(&self) -> Result<()> {
        if self.failing.get() {
            return Err(StoreError::Remote {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl DutyTable for MemoryTable {
    fn fetch_for_user(&self, session: &Session) -> Result<Vec<DutyRow>> {
        self.check()?;
        let mut rows = self.rows_for(session.user_id());
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    fn insert(&self, session: &Session, rows: &[DutyRow]) -> Result<Vec<DutyRow>> {
        self.check()?;
        let mut inserted = Vec::new();
        for row in rows {
            let id = self.next_id.get();
            self.next_id.set(id + 1);

            let mut row = row.clone();
            row.id = Some(id);
            row.user_id = session.user_id().to_string();
            inserted.push(row);
        }
        self.rows.borrow_mut().extend(inserted.iter().cloned());
        Ok(inserted)
    }

    fn update_completed_days(&self, session: &Session, id: i64, days: &[String]) -> Result<()> {
        self.check()?;
        let mut rows = self.rows.borrow_mut();
        if let Some(row) = rows
            .iter_mut()
            .find(|r| r.id == Some(id) && r.user_id == session.user_id())
        {
            row.completed_days = Some(days.to_vec());
        }
        Ok(())
    }

    fn delete(&self, session: &Session, id: i64) -> Result<()> {
        self.check()?;
        self.rows
            .borrow_mut()
            .retain(|r| !(r.id == Some(id) && r.user_id == session.user_id()));
        Ok(())
    }
}

/// 接受任意密码，只拒绝空密码
pub struct MemoryAuth;

pub fn session_for(user_id: &str) -> Session {
    Session {
        access_token: format!("token-{}", user_id),
        refresh_token: None,
        user: User {
            id: user_id.to_string(),
            email: Some(format!("{}@example.com", user_id)),
        },
    }
}

impl AuthProvider for MemoryAuth {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if password.is_empty() {
            return Err(StoreError::Remote {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        let user_id = email.split('@').next().unwrap_or(email);
        Ok(session_for(user_id))
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        self.sign_in(email, password).map(Some)
    }

    fn sign_out(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}

//! 远端协作方：duty 表和认证服务
#[cfg(test)]
pub mod memory;
mod rest;

pub use rest::RestClient;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::DutyRow;
use crate::storage::{keys, LocalPersistence};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// 登录会话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn display_name(&self) -> &str {
        self.user.email.as_deref().unwrap_or(&self.user.id)
    }
}

/// The shared `duties` table, one row per duty, scoped by `user_id`.
pub trait DutyTable {
    /// 当前用户的所有行，按 created_at 升序
    fn fetch_for_user(&self, session: &Session) -> Result<Vec<DutyRow>>;

    /// 插入并返回数据库分配了 id 的行
    fn insert(&self, session: &Session, rows: &[DutyRow]) -> Result<Vec<DutyRow>>;

    fn update_completed_days(&self, session: &Session, id: i64, days: &[String]) -> Result<()>;

    fn delete(&self, session: &Session, id: i64) -> Result<()>;
}

/// Opaque session provider.
pub trait AuthProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// 注册；服务端要求邮箱确认时返回 None
    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>>;

    fn sign_out(&self, session: &Session) -> Result<()>;
}

/// 读取本地保存的会话（当前用户）
pub fn current_session(local: &LocalPersistence) -> Option<Session> {
    local.read(keys::SESSION)
}

pub fn save_session(local: &mut LocalPersistence, session: &Session) -> Result<()> {
    local.write(keys::SESSION, session)
}

pub fn clear_session(local: &mut LocalPersistence) -> Result<()> {
    local.remove(keys::SESSION)
}

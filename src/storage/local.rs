use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{keys, KeyValueStore};
use crate::error::Result;
use crate::models::duty::duties_from_values;
use crate::models::{ChecklistItem, Duty};

/// Typed access to the named local collections and preference flags.
///
/// Reads never fail: a missing key is `None`, an unreadable or malformed blob
/// is logged and treated as missing.
pub struct LocalPersistence {
    store: Box<dyn KeyValueStore>,
}

impl LocalPersistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取并解析一个键
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read local key");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed local data, ignoring");
                None
            }
        }
    }

    /// 整体覆盖写入一个键
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.store.set(key, &json)
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.store.remove(key)
    }

    /// 当前 duty 列表；未保存过或不是数组时为 None。
    /// 记录逐条解析，坏字段补默认值，`now` 用于补缺失的 createdAt。
    pub fn load_duties(&self, now: DateTime<Utc>) -> Option<Vec<Duty>> {
        self.read_records(keys::DUTIES)
            .map(|items| duties_from_values(&items, now))
    }

    pub fn save_duties(&mut self, duties: &[Duty]) -> Result<()> {
        self.write(keys::DUTIES, duties)
    }

    /// 未经校验的原始记录，迁移时逐字段补默认值
    pub fn raw_duties(&self) -> Vec<Value> {
        self.read_records(keys::DUTIES).unwrap_or_default()
    }

    /// 读取一个数组形式的键；不存在、无法解析或不是数组时为 None
    fn read_records(&self, key: &str) -> Option<Vec<Value>> {
        match self.read::<Value>(key)? {
            Value::Array(items) => Some(items),
            _ => {
                tracing::warn!(key, "local list is not an array, ignoring");
                None
            }
        }
    }

    pub fn clear_duties(&mut self) -> Result<()> {
        self.store.remove(keys::DUTIES)
    }

    pub fn load_archive(&self, now: DateTime<Utc>) -> Vec<Duty> {
        self.read_records(keys::ARCHIVED_DUTIES)
            .map(|items| duties_from_values(&items, now))
            .unwrap_or_default()
    }

    pub fn save_archive(&mut self, archive: &[Duty]) -> Result<()> {
        self.write(keys::ARCHIVED_DUTIES, archive)
    }

    pub fn load_legacy_checklist(&self) -> Option<Vec<ChecklistItem>> {
        self.read(keys::LEGACY_CHECKLIST)
    }

    /// 布尔偏好；兼容写成字符串 "true" 的旧数据
    pub fn flag(&self, key: &str) -> bool {
        match self.read::<Value>(key) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<()> {
        self.write(key, &value)
    }

    pub fn dont_warn_old_date(&self) -> bool {
        self.flag(keys::DONT_WARN_OLD_DATE)
    }

    pub fn set_dont_warn_old_date(&mut self, value: bool) -> Result<()> {
        self.set_flag(keys::DONT_WARN_OLD_DATE, value)
    }

    pub fn has_migrated(&self) -> bool {
        self.flag(keys::HAS_MIGRATED)
    }

    pub fn mark_migrated(&mut self) -> Result<()> {
        self.set_flag(keys::HAS_MIGRATED, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap()
    }

    fn persistence_with(entries: &[(&str, &str)]) -> LocalPersistence {
        let mut store = MemoryStore::default();
        for (k, v) in entries {
            store.set(k, v).unwrap();
        }
        LocalPersistence::new(Box::new(store))
    }

    #[test]
    fn test_missing_and_malformed_are_none() {
        let local = persistence_with(&[(keys::ARCHIVED_DUTIES, "{not json")]);
        assert!(local.load_duties(now()).is_none());
        assert!(local.load_archive(now()).is_empty());
        assert!(local.raw_duties().is_empty());
    }

    #[test]
    fn test_flags_accept_string_values() {
        let mut local = persistence_with(&[(keys::DONT_WARN_OLD_DATE, "\"true\"")]);
        assert!(local.dont_warn_old_date());
        assert!(!local.has_migrated());

        local.mark_migrated().unwrap();
        assert!(local.has_migrated());

        local.set_dont_warn_old_date(false).unwrap();
        assert!(!local.dont_warn_old_date());
    }

    #[test]
    fn test_raw_duties_requires_array() {
        let local = persistence_with(&[(keys::DUTIES, r#"{"id": 1}"#)]);
        assert!(local.raw_duties().is_empty());
        assert!(local.load_duties(now()).is_none());

        let local = persistence_with(&[(keys::DUTIES, r#"[{"id": 1}, {"name": "x"}]"#)]);
        assert_eq!(local.raw_duties().len(), 2);
        assert_eq!(local.load_duties(now()).unwrap().len(), 2);
    }

    #[test]
    fn test_one_bad_record_does_not_drop_the_list() {
        let blob = r#"[
            {"id": 10, "name": "Real duty", "icon": "💧", "color": "teal", "duration": 21,
             "completedDays": ["2024-01-19"], "createdAt": "2024-01-01T08:00:00Z"},
            {"name": "Older record", "duration": "?", "color": "orange"},
            42
        ]"#;
        let local = persistence_with(&[(keys::DUTIES, blob), (keys::ARCHIVED_DUTIES, blob)]);

        let duties = local.load_duties(now()).unwrap();
        let names: Vec<&str> = duties.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Real duty", "Older record"]);

        let real = &duties[0];
        assert_eq!(real.id, 10);
        assert_eq!(real.duration, 21);
        assert_eq!(real.completed_days.len(), 1);

        // 坏字段补默认值，缺少的 id 不与已有的冲突
        let older = &duties[1];
        assert_eq!(older.id, 11);
        assert_eq!(older.duration, 66);
        assert_eq!(older.color, crate::models::DutyColor::Blue);
        assert_eq!(older.created_at, now());

        assert_eq!(local.load_archive(now()).len(), 2);
    }
}

//! Remote row shape for the `duties` table and the translation to and from
//! the local [`Duty`] shape. This is the only place that knows both field
//! namings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::duty::{
    parse_date, parse_timestamp, valid_duration, Duty, DEFAULT_DURATION, DEFAULT_ICON, UNTITLED,
};

/// 远端表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyRow {
    /// 插入时由数据库分配
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub completed_days: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DutyRow {
    /// 逐行解析接口返回的数组，无法解析的行记录日志后跳过
    pub fn from_values(values: Vec<Value>) -> Vec<DutyRow> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed remote row");
                    None
                }
            })
            .collect()
    }

    /// 本地 duty → 远端行（不带 id，由数据库分配）
    pub fn from_duty(duty: &Duty, user_id: &str) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            name: duty.name.clone(),
            description: Some(duty.description.clone()),
            icon: Some(duty.icon.clone()),
            color: Some(duty.color.name().to_string()),
            duration: Some(duty.duration as i64),
            completed_days: Some(format_days(&duty.completed_days)),
            created_at: Some(duty.created_at.to_rfc3339()),
        }
    }

    /// 远端行 → 本地 duty。缺失或非法字段用默认值补齐，
    /// `now` 用于补 created_at。没有 id 的行返回 None。
    pub fn to_duty(&self, now: DateTime<Utc>) -> Option<Duty> {
        let id = self.id?;
        Some(Duty {
            id,
            name: if self.name.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                self.name.clone()
            },
            description: self.description.clone().unwrap_or_default(),
            icon: self
                .icon
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            color: self
                .color
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or_default(),
            duration: self
                .duration
                .and_then(valid_duration)
                .unwrap_or(DEFAULT_DURATION),
            completed_days: self
                .completed_days
                .iter()
                .flatten()
                .filter_map(|s| parse_date(s))
                .collect(),
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(now),
        })
    }

    /// 从本地存储的原始 JSON 记录构造远端行（迁移用），字段缺失时补默认值
    pub fn from_local_value(value: &Value, user_id: &str, now: DateTime<Utc>) -> Self {
        Self::from_duty(&Duty::from_value(value, now), user_id)
    }
}

/// null 按空字符串处理，交给 `to_duty` 补默认值
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn format_days(days: &BTreeSet<NaiveDate>) -> Vec<String> {
    days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
}

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 默认目标天数（66 天养成一个习惯）
pub const DEFAULT_DURATION: u32 = 66;
pub const MIN_DURATION: u32 = 1;
pub const MAX_DURATION: u32 = 365;

pub const DEFAULT_ICON: &str = "📝";
pub const UNTITLED: &str = "Untitled duty";

/// 可选图标
pub const ICONS: [&str; 12] = [
    "📝", "💪", "🧠", "💧", "📚", "🏃‍♂️", "🧘‍♀️", "🎯", "🔥", "⭐", "🌱", "⚡",
];

/// 主题色，只影响显示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyColor {
    #[default]
    Blue,
    Green,
    Purple,
    Red,
    Yellow,
    Pink,
    Indigo,
    Teal,
}

impl DutyColor {
    pub const ALL: [DutyColor; 8] = [
        DutyColor::Blue,
        DutyColor::Green,
        DutyColor::Purple,
        DutyColor::Red,
        DutyColor::Yellow,
        DutyColor::Pink,
        DutyColor::Indigo,
        DutyColor::Teal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DutyColor::Blue => "blue",
            DutyColor::Green => "green",
            DutyColor::Purple => "purple",
            DutyColor::Red => "red",
            DutyColor::Yellow => "yellow",
            DutyColor::Pink => "pink",
            DutyColor::Indigo => "indigo",
            DutyColor::Teal => "teal",
        }
    }
}

impl fmt::Display for DutyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DutyColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DutyColor::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown color '{}'", s))
    }
}

/// A tracked recurring goal.
///
/// Serialized in the local camelCase shape; the remote row shape lives in
/// [`crate::models::remote::DutyRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duty {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub color: DutyColor,
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// 集合语义，序列化为日期字符串数组
    #[serde(default)]
    pub completed_days: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_duration() -> u32 {
    DEFAULT_DURATION
}

impl Duty {
    /// 日历范围起点（本地日期）
    pub fn start_date(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }

    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.completed_days.contains(&date)
    }

    /// 切换某天的完成状态，返回切换后的状态
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.completed_days.remove(&date) {
            false
        } else {
            self.completed_days.insert(date);
            true
        }
    }

    /// 进度 = 完成天数 / 目标天数，与已经过去多少天无关
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        self.completed_days.len() as f64 / self.duration as f64
    }

    /// 以今天或昨天结尾的连续完成天数
    pub fn current_streak(&self, today: NaiveDate) -> usize {
        let mut day = if self.is_completed(today) {
            today
        } else {
            match today.pred_opt() {
                Some(d) => d,
                None => return 0,
            }
        };

        let mut streak = 0;
        while self.is_completed(day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }
}

impl Duty {
    /// Build a duty from a loosely-shaped stored record.
    ///
    /// Records written by older revisions may miss fields or carry the wrong
    /// types; each field is read on its own and defaulted, so one bad field
    /// never discards the record. A missing id reads as 0.
    pub fn from_value(value: &Value, now: DateTime<Utc>) -> Duty {
        let name = value
            .get("name")
            .or_else(|| value.get("label"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNTITLED)
            .to_string();

        let icon = value
            .get("icon")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ICON)
            .to_string();

        let color = value
            .get("color")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<DutyColor>().ok())
            .unwrap_or_default();

        let duration = value
            .get("duration")
            .and_then(loose_i64)
            .and_then(valid_duration)
            .unwrap_or(DEFAULT_DURATION);

        let completed_days = value
            .get("completedDays")
            .and_then(Value::as_array)
            .map(|days| {
                days.iter()
                    .filter_map(Value::as_str)
                    .filter_map(parse_date)
                    .collect()
            })
            .unwrap_or_default();

        let created_at = value
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or(now);

        Duty {
            id: value.get("id").and_then(loose_i64).unwrap_or_default(),
            name,
            description: value
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            icon,
            color,
            duration,
            completed_days,
            created_at,
        }
    }
}

/// 逐条解析存储的 duty 列表：不是对象的记录跳过，缺少 id 的补一个不冲突的
pub fn duties_from_values(items: &[Value], now: DateTime<Utc>) -> Vec<Duty> {
    let mut duties: Vec<Duty> = items
        .iter()
        .filter(|item| {
            let keep = item.is_object();
            if !keep {
                tracing::warn!(record = %item, "skipping stored duty that is not an object");
            }
            keep
        })
        .map(|item| Duty::from_value(item, now))
        .collect();

    let mut next_id = duties.iter().map(|d| d.id).max().unwrap_or(0).max(0) + 1;
    for duty in duties.iter_mut().filter(|d| d.id == 0) {
        duty.id = next_id;
        next_id += 1;
    }
    duties
}

/// 数字、浮点或数字字符串
fn loose_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

pub(crate) fn valid_duration(d: i64) -> Option<u32> {
    u32::try_from(d)
        .ok()
        .filter(|d| (MIN_DURATION..=MAX_DURATION).contains(d))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// 新建 duty 的表单数据
#[derive(Debug, Clone, PartialEq)]
pub struct DutyDraft {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: DutyColor,
    pub duration: u32,
}

impl Default for DutyDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            icon: DEFAULT_ICON.to_string(),
            color: DutyColor::default(),
            duration: DEFAULT_DURATION,
        }
    }
}

impl DutyDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 校验表单：名称非空，图标来自 `ICONS`（空表示默认），天数在 [1, 365]
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !self.icon.is_empty() && !ICONS.contains(&self.icon.as_str()) {
            return Err(format!(
                "unknown icon '{}', choose one of: {}",
                self.icon,
                ICONS.join(" ")
            ));
        }
        if !(MIN_DURATION..=MAX_DURATION).contains(&self.duration) {
            return Err(format!(
                "duration must be between {} and {} days",
                MIN_DURATION, MAX_DURATION
            ));
        }
        Ok(())
    }

    pub fn into_duty(self, id: i64, created_at: DateTime<Utc>) -> Duty {
        Duty {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            icon: if self.icon.is_empty() {
                DEFAULT_ICON.to_string()
            } else {
                self.icon
            },
            color: self.color,
            duration: self.duration,
            completed_days: BTreeSet::new(),
            created_at,
        }
    }
}

/// 解析 `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn sample() -> Duty {
        DutyDraft::named("Meditate").into_duty(1, Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut duty = sample();
        let day = date("2024-01-15");

        assert!(duty.toggle(day));
        assert!(!duty.toggle(day));
        assert!(duty.completed_days.is_empty());

        // on/off/on = on
        duty.toggle(day);
        duty.toggle(day);
        duty.toggle(day);
        assert!(duty.is_completed(day));
    }

    #[test]
    fn test_progress_ignores_elapsed_days() {
        let mut duty = sample();
        for d in ["2024-01-06", "2024-01-07", "2024-01-09"] {
            duty.toggle(date(d));
        }
        assert_eq!(duty.duration, 66);
        assert!((duty.progress() - 3.0 / 66.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_current_streak() {
        let mut duty = sample();
        for d in ["2024-01-10", "2024-01-11", "2024-01-12", "2024-01-14"] {
            duty.toggle(date(d));
        }
        // 今天没打卡，从昨天往回数
        assert_eq!(duty.current_streak(date("2024-01-15")), 1);
        assert_eq!(duty.current_streak(date("2024-01-13")), 3);
        assert_eq!(duty.current_streak(date("2024-01-17")), 0);
    }

    #[test]
    fn test_draft_validation() {
        assert!(DutyDraft::named("Read").validate().is_ok());
        assert!(DutyDraft::named("   ").validate().is_err());

        let mut draft = DutyDraft::named("Run");
        draft.duration = 0;
        assert!(draft.validate().is_err());
        draft.duration = 366;
        assert!(draft.validate().is_err());
        draft.duration = 365;
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_icon_must_come_from_palette() {
        let mut draft = DutyDraft::named("Swim");
        draft.icon = "💧".to_string();
        assert!(draft.validate().is_ok());
        draft.icon = String::new();
        assert!(draft.validate().is_ok());
        draft.icon = "🦄".to_string();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_local_json_shape() {
        let json = r#"{
            "id": 1719000000000,
            "name": "Drink water",
            "description": "",
            "icon": "💧",
            "color": "teal",
            "duration": 30,
            "completedDays": ["2024-06-02", "2024-06-01", "2024-06-02"],
            "createdAt": "2024-06-01T08:00:00.000Z"
        }"#;

        let duty: Duty = serde_json::from_str(json).unwrap();
        assert_eq!(duty.color, DutyColor::Teal);
        // 重复日期被合并
        assert_eq!(duty.completed_days.len(), 2);

        let value = serde_json::to_value(&duty).unwrap();
        assert!(value.get("completedDays").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["completedDays"][0], "2024-06-01");
    }

    #[test]
    fn test_color_from_str() {
        assert_eq!("Purple".parse::<DutyColor>(), Ok(DutyColor::Purple));
        assert!("orange".parse::<DutyColor>().is_err());
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::duty::{Duty, DutyDraft};

/// 旧版本的单条清单项（`checklistData`），已被 duty 取代
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: i64,
    #[serde(default)]
    pub goal_id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ChecklistItem {
    /// 转换为 duty；已勾选的项记为今天完成。停用或空标签的项返回 None
    pub fn into_duty(self, created_at: DateTime<Utc>, today: NaiveDate) -> Option<Duty> {
        if !self.active || self.label.trim().is_empty() {
            return None;
        }

        let mut duty = DutyDraft::named(self.label).into_duty(self.id, created_at);
        if self.completed {
            duty.completed_days.insert(today);
        }
        Some(duty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_legacy_item_conversion() {
        let items: Vec<ChecklistItem> = serde_json::from_str(
            r#"[
                {"id": 1, "goalId": "goal-1", "label": "Drink 2L of water", "completed": true, "active": true},
                {"id": 2, "goalId": "goal-2", "label": "Read 10 pages", "completed": false, "active": false},
                {"id": 3, "label": "  ", "completed": false}
            ]"#,
        )
        .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let duties: Vec<Duty> = items
            .into_iter()
            .filter_map(|item| item.into_duty(now, today))
            .collect();

        assert_eq!(duties.len(), 1);
        assert_eq!(duties[0].name, "Drink 2L of water");
        assert_eq!(duties[0].duration, 66);
        assert!(duties[0].is_completed(today));
    }
}

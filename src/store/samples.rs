use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{Duty, DutyColor};

/// 首次启动时展示的两个示例 duty（带一些历史记录）
pub fn sample_duties(now: DateTime<Utc>, today: NaiveDate) -> Vec<Duty> {
    let mut exercise = Duty {
        id: 1,
        name: "Morning Exercise".to_string(),
        description: "30 minutes of movement before breakfast".to_string(),
        icon: "💪".to_string(),
        color: DutyColor::Green,
        duration: 66,
        completed_days: Default::default(),
        created_at: now - Duration::days(14),
    };
    // 每三天漏一天
    for offset in 1..=14 {
        if offset % 3 != 0 {
            exercise.completed_days.insert(today - Duration::days(offset));
        }
    }

    let mut reading = Duty {
        id: 2,
        name: "Read 10 pages".to_string(),
        description: String::new(),
        icon: "📚".to_string(),
        color: DutyColor::Purple,
        duration: 30,
        completed_days: Default::default(),
        created_at: now - Duration::days(7),
    };
    for offset in 1..=4 {
        reading.completed_days.insert(today - Duration::days(offset));
    }

    vec![exercise, reading]
}

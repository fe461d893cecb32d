//! 统计：最近若干天的完成率，以及每个 duty 的进度和连续天数

use chrono::{Duration, NaiveDate};

use crate::models::Duty;

/// 统计窗口天数
pub const WINDOW_DAYS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub completed: usize,
    /// 当天已经存在的 duty 数
    pub total: usize,
    pub percentage: u8,
}

impl DailyStat {
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub perfect_days: usize,
    pub average_percentage: u8,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DutyStat {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub completed: usize,
    pub duration: u32,
    pub progress: f64,
    pub streak: usize,
}

/// 以 `today` 结尾的 `days` 天，按日期升序
pub fn daily_completion(duties: &[Duty], today: NaiveDate, days: usize) -> Vec<DailyStat> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            let existing: Vec<&Duty> = duties.iter().filter(|d| d.start_date() <= date).collect();
            let completed = existing.iter().filter(|d| d.is_completed(date)).count();
            DailyStat {
                date,
                completed,
                total: existing.len(),
                percentage: percentage(completed, existing.len()),
            }
        })
        .collect()
}

pub fn summarize(daily: &[DailyStat]) -> Summary {
    let perfect_days = daily.iter().filter(|d| d.is_perfect()).count();
    let average_percentage = if daily.is_empty() {
        0
    } else {
        let sum: u32 = daily.iter().map(|d| d.percentage as u32).sum();
        (sum as f64 / daily.len() as f64).round() as u8
    };

    Summary {
        perfect_days,
        average_percentage,
        days: daily.len(),
    }
}

pub fn per_duty(duties: &[Duty], today: NaiveDate) -> Vec<DutyStat> {
    duties
        .iter()
        .map(|d| DutyStat {
            id: d.id,
            name: d.name.clone(),
            icon: d.icon.clone(),
            completed: d.completed_days.len(),
            duration: d.duration,
            progress: d.progress(),
            streak: d.current_streak(today),
        })
        .collect()
}

fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

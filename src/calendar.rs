//! Month grid arithmetic for the duty cards.
//!
//! Weeks start on Monday. Everything here is a pure function of the month,
//! the completed set and "today".

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

/// 星期标题（周一开始）
pub const DAY_LABELS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

/// 超过这么多天之前的日期，切换前需要确认
pub const OLD_DATE_WARNING_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let next_first = self.next().first_day();
        (next_first - self.first_day()).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// e.g. "March 2024"
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

/// 周一为 0 的星期序号：`(原生星期 + 6) % 7`，原生星期以周日为 0
pub fn weekday_index(date: NaiveDate) -> usize {
    let native = date.weekday().num_days_from_sunday() as usize;
    (native + 6) % 7
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub completed: bool,
    pub today: bool,
    /// 严格晚于今天
    pub future: bool,
}

impl DayCell {
    /// 未来的日期不可点击
    pub fn is_interactive(&self) -> bool {
        !self.future
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    /// 对齐用的空白格
    Filler,
    Day(DayCell),
}

impl CalendarCell {
    pub fn day(&self) -> Option<&DayCell> {
        match self {
            CalendarCell::Day(cell) => Some(cell),
            CalendarCell::Filler => None,
        }
    }
}

/// 生成一个月的日历格子。
///
/// The 1st lands under its Monday-indexed weekday column and the sequence is
/// padded with trailing fillers to a multiple of 7, so it always splits into
/// whole weeks without a spare row.
pub fn month_grid(
    month: Month,
    completed_days: &BTreeSet<NaiveDate>,
    today: NaiveDate,
) -> Vec<CalendarCell> {
    let first = month.first_day();
    let leading = weekday_index(first);
    let days = month.days_in_month() as usize;
    let total = (leading + days).div_ceil(7) * 7;

    let mut cells = Vec::with_capacity(total);
    cells.extend(std::iter::repeat_n(CalendarCell::Filler, leading));

    for offset in 0..days {
        let date = first + Duration::days(offset as i64);
        cells.push(CalendarCell::Day(DayCell {
            date,
            completed: completed_days.contains(&date),
            today: date == today,
            future: date > today,
        }));
    }

    cells.resize(total, CalendarCell::Filler);
    cells
}

/// 按周切分
pub fn weeks(cells: &[CalendarCell]) -> impl Iterator<Item = &[CalendarCell]> {
    cells.chunks(7)
}

/// 编辑超过 7 天前的日期需要确认
pub fn needs_confirmation(date: NaiveDate, today: NaiveDate) -> bool {
    date < today - Duration::days(OLD_DATE_WARNING_DAYS)
}

/// 日期是否在 `[start, today]` 范围内（界面上允许切换的范围）
pub fn in_tracked_range(date: NaiveDate, start: NaiveDate, today: NaiveDate) -> bool {
    date >= start && date <= today
}

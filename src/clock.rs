use chrono::{DateTime, Local, NaiveDate, Utc};

/// 时间来源，便于测试时固定"今天"
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// 本地日期意义上的今天
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

#[cfg(test)]
impl FixedClock {
    /// `today` 的中午（UTC）
    pub fn on(today: NaiveDate) -> Self {
        Self {
            now: today.and_hms_opt(12, 0, 0).unwrap().and_utc(),
            today,
        }
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

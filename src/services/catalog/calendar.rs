use chrono::{Datelike, NaiveDate, Weekday};

use crate::types::DateSnapshot;

/// Tokyo exchange holidays in 2026 that fall on weekdays.
const TOKYO_2026_HOLIDAYS: [(u32, u32); 14] = [
    (1, 1),
    (1, 12),
    (2, 11),
    (3, 20),
    (4, 29),
    (5, 4),
    (5, 5),
    (7, 20),
    (8, 11),
    (9, 21),
    (9, 22),
    (11, 3),
    (11, 23),
    (12, 31),
];

/// Ordered trading dates. The session clock is an index into this list.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessCalendar {
    dates: Vec<NaiveDate>,
}

impl BusinessCalendar {
    pub fn from_dates(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    /// Every weekday of `year` that is not in `holidays`.
    pub fn for_year(year: i32, holidays: &[NaiveDate]) -> Self {
        let mut dates = Vec::new();
        let mut day = NaiveDate::from_ymd_opt(year, 1, 1);
        while let Some(date) = day {
            if date.year() != year {
                break;
            }
            let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            if !weekend && !holidays.contains(&date) {
                dates.push(date);
            }
            day = date.succ_opt();
        }
        Self { dates }
    }

    pub fn tokyo_2026() -> Self {
        let holidays: Vec<NaiveDate> = TOKYO_2026_HOLIDAYS
            .iter()
            .filter_map(|(m, d)| NaiveDate::from_ymd_opt(2026, *m, *d))
            .collect();
        Self::for_year(2026, &holidays)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    pub fn snapshot(&self, index: usize) -> Option<DateSnapshot> {
        let date = self.get(index)?;
        let timestamp = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
        Some(DateSnapshot {
            date: date.format("%Y-%m-%d").to_string(),
            timestamp,
            day_index: index,
            remaining_days: self.len().saturating_sub(index + 1),
        })
    }
}

use chrono::{Datelike, NaiveDate, Weekday};
use shared::{DomainError, DomainResult};

/// A target month in "YYYY-MM" form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleMonth {
    pub year: i32,
    pub month: u32,
}

impl ScheduleMonth {
    pub fn parse(month: &str) -> DomainResult<Self> {
        let (year, mon) = month
            .split_once('-')
            .ok_or_else(|| DomainError::InvalidInput(format!("Invalid month: {month}")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| DomainError::InvalidInput(format!("Invalid month: {month}")))?;
        let mon: u32 = mon
            .parse()
            .map_err(|_| DomainError::InvalidInput(format!("Invalid month: {month}")))?;
        if !(1..=12).contains(&mon) {
            return Err(DomainError::InvalidInput(format!("Invalid month: {month}")));
        }
        Ok(Self { year, month: mon })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("valid first of month")
    }

    pub fn days_in_month(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.expect("valid first of next month")
            .signed_duration_since(self.first_day())
            .num_days() as u32
    }

    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days_in_month())
            .expect("valid last of month")
    }

    /// Every date of the month, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (1..=self.days_in_month())
            .map(|d| NaiveDate::from_ymd_opt(self.year, self.month, d).expect("valid date"))
            .collect()
    }

    /// Dates the roster is staffed on: not a weekend, not a holiday.
    pub fn working_dates(&self) -> Vec<NaiveDate> {
        self.dates()
            .into_iter()
            .filter(|d| !is_non_working_day(*d))
            .collect()
    }
}

impl std::fmt::Display for ScheduleMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// Japanese holidays (2025-2027 covering typical usage)
const JAPANESE_HOLIDAYS: &[(i32, u32, u32)] = &[
    (2025, 1, 1),
    (2025, 1, 13),
    (2025, 2, 11),
    (2025, 2, 23),
    (2025, 2, 24),
    (2025, 3, 20),
    (2025, 4, 29),
    (2025, 5, 3),
    (2025, 5, 4),
    (2025, 5, 5),
    (2025, 5, 6),
    (2025, 7, 21),
    (2025, 8, 11),
    (2025, 9, 15),
    (2025, 9, 23),
    (2025, 10, 13),
    (2025, 11, 3),
    (2025, 11, 23),
    (2025, 11, 24),
    (2026, 1, 1),
    (2026, 1, 12),
    (2026, 2, 11),
    (2026, 2, 23),
    (2026, 3, 20),
    (2026, 4, 29),
    (2026, 5, 3),
    (2026, 5, 4),
    (2026, 5, 5),
    (2026, 5, 6),
    (2026, 7, 20),
    (2026, 8, 11),
    (2026, 9, 21),
    (2026, 9, 22),
    (2026, 9, 23),
    (2026, 10, 12),
    (2026, 11, 3),
    (2026, 11, 23),
    (2027, 1, 1),
    (2027, 1, 11),
    (2027, 2, 11),
    (2027, 2, 23),
    (2027, 3, 21),
    (2027, 3, 22),
    (2027, 4, 29),
    (2027, 5, 3),
    (2027, 5, 4),
    (2027, 5, 5),
    (2027, 7, 19),
    (2027, 8, 11),
    (2027, 9, 20),
    (2027, 9, 23),
    (2027, 10, 11),
    (2027, 11, 3),
    (2027, 11, 23),
];

/// The "YYYY-MM" month `months` months before `today`'s month. Schedules,
/// requests, and requirements for months strictly before the cutoff are
/// eligible for retention cleanup.
pub fn retention_cutoff(today: NaiveDate, months: u32) -> String {
    let total = today.year() * 12 + today.month0() as i32 - months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) + 1;
    format!("{year:04}-{month:02}")
}

pub fn is_holiday(d: NaiveDate) -> bool {
    JAPANESE_HOLIDAYS
        .iter()
        .any(|&(y, m, day)| d.year() == y && d.month() == m && d.day() == day)
}

/// Saturday, Sunday, or Japanese holiday.
pub fn is_non_working_day(d: NaiveDate) -> bool {
    matches!(d.weekday(), Weekday::Sat | Weekday::Sun) || is_holiday(d)
}

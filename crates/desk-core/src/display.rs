//! # Display Formatting
//!
//! Currency and date rendering shared by every table and card: receivable
//! lists, commission statements, task due dates.

use chrono::{DateTime, NaiveDate, Utc};

use crate::money::Money;

/// Currency suffix appended to formatted amounts.
pub const CURRENCY: &str = "SAR";

/// Format an amount as `1,234.50 SAR`.
pub fn format_sar(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let minor = amount.minor().unsigned_abs();
    let whole = group_thousands(minor / 100);
    format!("{sign}{whole}.{:02} {CURRENCY}", minor % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM` in UTC.
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Where a due date falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// Past due by this many days.
    Overdue(i64),
    DueToday,
    /// Due in this many days.
    DueIn(i64),
}

impl DueStatus {
    pub fn is_overdue(self) -> bool {
        matches!(self, DueStatus::Overdue(_))
    }
}

impl std::fmt::Display for DueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DueStatus::Overdue(1) => write!(f, "1 day overdue"),
            DueStatus::Overdue(days) => write!(f, "{days} days overdue"),
            DueStatus::DueToday => write!(f, "due today"),
            DueStatus::DueIn(1) => write!(f, "due tomorrow"),
            DueStatus::DueIn(days) => write!(f, "due in {days} days"),
        }
    }
}

/// Compare a due date against `today`.
pub fn due_status(due: NaiveDate, today: NaiveDate) -> DueStatus {
    let days = (due - today).num_days();
    match days {
        0 => DueStatus::DueToday,
        d if d < 0 => DueStatus::Overdue(-d),
        d => DueStatus::DueIn(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_currency_with_grouping() {
        assert_eq!(format_sar(Money::from_minor(123_450)), "1,234.50 SAR");
        assert_eq!(format_sar(Money::from_minor(100_000_000)), "1,000,000.00 SAR");
        assert_eq!(format_sar(Money::from_minor(5)), "0.05 SAR");
        assert_eq!(format_sar(Money::from_minor(-99_900)), "-999.00 SAR");
    }

    #[test]
    fn formats_dates() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_date(d), "2026-03-09");
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 59).unwrap();
        assert_eq!(format_datetime(at), "2026-03-09 14:05");
    }

    #[test]
    fn due_status_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 5, 9).unwrap();
        let next_week = NaiveDate::from_ymd_opt(2026, 5, 17).unwrap();
        assert_eq!(due_status(today, today), DueStatus::DueToday);
        assert_eq!(due_status(yesterday, today), DueStatus::Overdue(1));
        assert_eq!(due_status(next_week, today), DueStatus::DueIn(7));
        assert!(due_status(yesterday, today).is_overdue());
        assert_eq!(due_status(yesterday, today).to_string(), "1 day overdue");
        assert_eq!(due_status(next_week, today).to_string(), "due in 7 days");
    }
}

use chrono::{DateTime, Months, Utc};

use crate::errors::{Result, StoreError};

/// advance a date by whole calendar months
///
/// Always measured from `start`, never chained from the previous due date,
/// and clamped to the last day of the target month: Jan 31 + 1 is Feb 28
/// (29 in leap years), Jan 31 + 2 is Mar 31.
pub fn add_months(start: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| StoreError::InvalidDate {
            message: format!("{start} + {months} months is out of range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_month_end_clamps() {
        let jan31 = Utc.with_ymd_and_hms(2025, 1, 31, 10, 30, 0).unwrap();
        let feb = add_months(jan31, 1).unwrap();
        assert_eq!((feb.month(), feb.day()), (2, 28));

        let mar = add_months(jan31, 2).unwrap();
        assert_eq!((mar.month(), mar.day()), (3, 31));

        let apr = add_months(jan31, 3).unwrap();
        assert_eq!((apr.month(), apr.day()), (4, 30));
    }

    #[test]
    fn test_leap_february() {
        let jan31 = Utc.with_ymd_and_hms(2028, 1, 31, 0, 0, 0).unwrap();
        let feb = add_months(jan31, 1).unwrap();
        assert_eq!((feb.year(), feb.month(), feb.day()), (2028, 2, 29));
    }

    #[test]
    fn test_year_rollover_keeps_time_of_day() {
        let start = Utc.with_ymd_and_hms(2026, 11, 15, 9, 0, 0).unwrap();
        let due = add_months(start, 3).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2027, 2, 15, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            add_months(DateTime::<Utc>::MAX_UTC, 1),
            Err(StoreError::InvalidDate { .. })
        ));
    }
}

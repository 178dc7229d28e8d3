//! Calendar helpers

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// Midnight at the start of `date`
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last whole second of `date` (`date + 1 day - 1 second`)
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    start_of_day(next) - TimeDelta::seconds(1)
}

/// Timestamp suffix for export file names, e.g. `20240501_093000`
pub fn export_stamp(time: &DateTime<Local>) -> String {
    time.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let end = end_of_day(date);
        assert_eq!(end.to_string(), "2024-02-28 23:59:59");
    }

    #[test]
    fn test_end_of_day_leap_year() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(end_of_day(date).date(), date);
    }

    #[test]
    fn test_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(start_of_day(date).to_string(), "2024-05-01 00:00:00");
    }

    #[test]
    fn test_export_stamp() {
        let time = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(export_stamp(&time), "20240501_093000");
    }
}

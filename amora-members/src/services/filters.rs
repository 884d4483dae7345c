use chrono::{Days, Months, NaiveDate};

/// Convert an age range into a date-of-birth window, inclusive on both ends.
///
/// A member is `min_age` the day of their birthday, and stays `max_age`
/// until the day before their next one. Returns `(earliest, latest)` dates
/// of birth; filter with `date_of_birth BETWEEN earliest AND latest`.
pub fn dob_window(today: NaiveDate, min_age: u32, max_age: u32) -> (NaiveDate, NaiveDate) {
    let latest = today
        .checked_sub_months(Months::new(min_age * 12))
        .unwrap_or(today);
    let earliest = today
        .checked_sub_months(Months::new((max_age + 1) * 12))
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .unwrap_or(today);
    (earliest, latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let today = date(2026, 8, 6);
        let (earliest, latest) = dob_window(today, 18, 25);

        // 18th birthday today: included
        assert_eq!(latest, date(2008, 8, 6));
        // turns 26 tomorrow, still 25 today: included
        assert_eq!(earliest, date(2000, 8, 7));
    }

    #[test]
    fn single_year_window() {
        let today = date(2026, 8, 6);
        let (earliest, latest) = dob_window(today, 30, 30);
        assert_eq!(latest, date(1996, 8, 6));
        assert_eq!(earliest, date(1995, 8, 7));
        assert!(earliest <= latest);
    }

    #[test]
    fn leap_day_does_not_panic() {
        let today = date(2024, 2, 29);
        let (earliest, latest) = dob_window(today, 18, 100);
        assert!(earliest < latest);
    }
}

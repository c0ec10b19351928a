//! Calendar-aware age arithmetic.
//!
//! Age is always derived from the date of birth at the evaluation instant,
//! never stored as authoritative state, so a subject's permissions shift the
//! day they cross a threshold rather than whenever a cached value was last
//! refreshed.

use chrono::{Datelike, NaiveDate};

/// Whole elapsed years between `dob` and `on`.
///
/// Counts a year only once the birthday has occurred, so a subject born
/// exactly N years before `on` is N years old on that day. A Feb 29 birthday
/// is counted on Mar 1 in non-leap years. Returns 0 for a `dob` in the
/// future; callers are expected to reject future dates at the validation
/// boundary.
#[must_use]
pub fn age_on(dob: NaiveDate, on: NaiveDate) -> u8 {
    if dob > on {
        return 0;
    }

    let mut age = on.year() - dob.year();
    if !has_had_birthday(dob, on) {
        age -= 1;
    }
    age.clamp(0, u8::MAX as i32) as u8
}

/// Whether the birthday for `dob` has already occurred in `on`'s year.
#[must_use]
pub fn has_had_birthday(dob: NaiveDate, on: NaiveDate) -> bool {
    // Feb 29 falls back to Mar 1 in non-leap years.
    let birthday = NaiveDate::from_ymd_opt(on.year(), dob.month(), dob.day())
        .or_else(|| NaiveDate::from_ymd_opt(on.year(), 3, 1));

    match birthday {
        Some(birthday) => on >= birthday,
        None => false,
    }
}

/// Whether `on` is the day the subject's computed age changes.
///
/// The birthday transition sweep uses this to gate its writes: comparing
/// today's age to yesterday's makes the sweep idempotent per subject per day.
#[must_use]
pub fn is_age_change_day(dob: NaiveDate, on: NaiveDate) -> bool {
    let yesterday = on.pred_opt().unwrap_or(on);
    age_on(dob, on) != age_on(dob, yesterday)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_age_basic() {
        assert_eq!(age_on(d(2010, 6, 15), d(2025, 6, 16)), 15);
        assert_eq!(age_on(d(2010, 6, 15), d(2025, 12, 1)), 15);
        assert_eq!(age_on(d(2010, 6, 15), d(2026, 1, 1)), 15);
    }

    #[test]
    fn test_age_on_exact_birthday() {
        // A subject whose birthday is exactly today has turned the new age today.
        assert_eq!(age_on(d(2010, 6, 15), d(2025, 6, 15)), 15);
        // One day before, still the old age.
        assert_eq!(age_on(d(2010, 6, 15), d(2025, 6, 14)), 14);
    }

    #[test]
    fn test_age_not_simple_year_difference() {
        // Year difference is 15, but the birthday has not occurred yet.
        assert_eq!(age_on(d(2010, 12, 31), d(2025, 1, 1)), 14);
    }

    #[test]
    fn test_leap_year_birthday() {
        let dob = d(2012, 2, 29);
        // Non-leap year: counted on Mar 1.
        assert_eq!(age_on(dob, d(2025, 2, 28)), 12);
        assert_eq!(age_on(dob, d(2025, 3, 1)), 13);
        // Leap year: counted on Feb 29 itself.
        assert_eq!(age_on(dob, d(2024, 2, 29)), 12);
        assert_eq!(age_on(dob, d(2024, 2, 28)), 11);
    }

    #[test]
    fn test_future_dob_clamps_to_zero() {
        assert_eq!(age_on(d(2030, 1, 1), d(2025, 1, 1)), 0);
    }

    #[test]
    fn test_is_age_change_day() {
        let dob = d(2010, 6, 15);
        assert!(is_age_change_day(dob, d(2025, 6, 15)));
        assert!(!is_age_change_day(dob, d(2025, 6, 16)));
        assert!(!is_age_change_day(dob, d(2025, 6, 14)));
    }

    #[test]
    fn test_is_age_change_day_leap() {
        let dob = d(2012, 2, 29);
        assert!(is_age_change_day(dob, d(2025, 3, 1)));
        assert!(!is_age_change_day(dob, d(2025, 2, 28)));
        assert!(is_age_change_day(dob, d(2024, 2, 29)));
    }
}

// src/fetch/years.rs

use chrono::{Datelike, NaiveDate, Utc};

/// First census year the dataset covers.
pub const EPOCH_YEAR: i32 = 1995;

/// Census cadence in years.
pub const CADENCE: i32 = 5;

/// Source of "today" for year planning.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Census years from `EPOCH_YEAR` up to the latest 5-year boundary at or
/// before `today`'s year. Empty when `today` precedes the epoch.
pub fn candidate_years(today: NaiveDate) -> Vec<i32> {
    let current = today.year();
    let latest = current - current.rem_euclid(CADENCE);
    (EPOCH_YEAR..=latest).step_by(CADENCE as usize).collect()
}

/// e-Stat time code for October 1 of `year`.
pub fn time_code(year: i32) -> String {
    format!("{}100000", year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_years_at_start_of_2021() {
        assert_eq!(
            candidate_years(ymd(2021, 1, 1)),
            vec![1995, 2000, 2005, 2010, 2015, 2020]
        );
    }

    #[test]
    fn test_boundary_year_is_included() {
        let years = candidate_years(ymd(2025, 3, 14));
        assert_eq!(years.last(), Some(&2025));
        assert_eq!(candidate_years(ymd(2024, 12, 31)).last(), Some(&2020));
    }

    #[test]
    fn test_epoch_year_alone() {
        assert_eq!(candidate_years(ymd(1995, 6, 1)), vec![1995]);
        assert_eq!(candidate_years(ymd(1999, 12, 31)), vec![1995]);
        assert!(candidate_years(ymd(1990, 1, 1)).is_empty());
    }

    #[test]
    fn test_spacing_holds_for_many_dates() {
        for year in 1995..2100 {
            let years = candidate_years(ymd(year, 7, 1));
            assert_eq!(years[0], EPOCH_YEAR);
            assert!(years.windows(2).all(|w| w[1] - w[0] == CADENCE));
            let last = *years.last().unwrap();
            assert!(last <= year && year - last < CADENCE);
        }
    }

    #[test]
    fn test_fixed_clock_drives_planning() {
        let clock = FixedClock(ymd(2010, 10, 1));
        assert_eq!(candidate_years(clock.today()).len(), 4);
    }

    #[test]
    fn test_time_code() {
        assert_eq!(time_code(2020), "2020100000");
    }
}

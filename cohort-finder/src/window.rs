use chrono::{Months, NaiveDate};
use shared_types::AgeRange;

/// Birthdates of people aged within an [`AgeRange`] on a given day.
///
/// The window is half-open: `(born_after, born_on_or_before]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdateWindow {
    /// Exclusive lower bound: born on this day means already `max_age + 1`
    pub born_after: NaiveDate,
    /// Inclusive upper bound: born on this day means exactly `min_age`
    pub born_on_or_before: NaiveDate,
}

impl BirthdateWindow {
    pub fn for_ages(ages: AgeRange, today: NaiveDate) -> Self {
        Self {
            born_after: years_before(today, ages.max_age.saturating_add(1)),
            born_on_or_before: years_before(today, ages.min_age),
        }
    }

    pub fn contains(&self, birth_date: NaiveDate) -> bool {
        birth_date > self.born_after && birth_date <= self.born_on_or_before
    }

    /// FHIR search parameters restricting a Condition search to subjects
    /// born inside the window.
    pub fn condition_search_params(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "subject.birthdate",
                format!("le{}", self.born_on_or_before.format("%Y-%m-%d")),
            ),
            (
                "subject.birthdate",
                format!("gt{}", self.born_after.format("%Y-%m-%d")),
            ),
        ]
    }
}

/// Same calendar day `years` earlier; Feb 29 falls back to Feb 28.
fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        let today = date(2024, 6, 15);
        let window = BirthdateWindow::for_ages(AgeRange::new(50, 70).unwrap(), today);

        assert_eq!(window.born_on_or_before, date(1974, 6, 15));
        assert_eq!(window.born_after, date(1953, 6, 15));
    }

    #[test]
    fn test_window_is_never_empty() {
        let today = date(2023, 1, 1);
        for (min_age, max_age) in [(0, 0), (0, 1), (17, 17), (50, 70), (100, 105), (120, 150)] {
            let window =
                BirthdateWindow::for_ages(AgeRange::new(min_age, max_age).unwrap(), today);
            assert!(
                window.born_after < window.born_on_or_before,
                "empty window for {min_age}..={max_age}"
            );
        }
    }

    #[test]
    fn test_boundary_birthdays() {
        let today = date(2024, 6, 15);
        let window = BirthdateWindow::for_ages(AgeRange::new(50, 70).unwrap(), today);

        // Turns 50 today: included
        assert!(window.contains(date(1974, 6, 15)));
        // Turns 50 tomorrow: still 49
        assert!(!window.contains(date(1974, 6, 16)));
        // Turns 71 today: excluded
        assert!(!window.contains(date(1953, 6, 15)));
        // Turns 71 tomorrow: still 70
        assert!(window.contains(date(1953, 6, 16)));
    }

    #[test]
    fn test_leap_day_clamps() {
        let today = date(2024, 2, 29);
        let window = BirthdateWindow::for_ages(AgeRange::new(1, 1).unwrap(), today);

        assert_eq!(window.born_on_or_before, date(2023, 2, 28));
        assert_eq!(window.born_after, date(2022, 2, 28));
    }

    #[test]
    fn test_search_params() {
        let today = date(2024, 6, 15);
        let window = BirthdateWindow::for_ages(AgeRange::new(100, 105).unwrap(), today);

        assert_eq!(
            window.condition_search_params(),
            vec![
                ("subject.birthdate", "le1924-06-15".to_string()),
                ("subject.birthdate", "gt1918-06-15".to_string()),
            ]
        );
    }
}

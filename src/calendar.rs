//! Linear day units.
//!
//! Dates are flattened onto a single axis assuming 12 months of 31 days.
//! The unit is only used for ordering and plotting.

pub const DAYS_PER_MONTH: i64 = 31;
pub const MONTHS_PER_YEAR: i64 = 12;
pub const DAYS_PER_YEAR: i64 = DAYS_PER_MONTH * MONTHS_PER_YEAR;

/// `year * 372 + month * 31 + day`, or `None` on overflow.
pub fn day_number(year: i64, month: i64, day: i64) -> Option<i64> {
    year.checked_mul(DAYS_PER_YEAR)?
        .checked_add(month.checked_mul(DAYS_PER_MONTH)?)?
        .checked_add(day)
}

/// First day unit of `year`.
pub fn year_start(year: i64) -> Option<i64> {
    day_number(year, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_number() {
        assert_eq!(day_number(2000, 1, 1), Some(2000 * 372 + 31 + 1));
        assert_eq!(day_number(-500, 6, 15), Some(-500 * 372 + 6 * 31 + 15));
        assert_eq!(year_start(1), Some(372));
    }

    #[test]
    fn test_day_number_overflow() {
        assert_eq!(day_number(i64::MAX / 100, 1, 1), None);
        assert_eq!(year_start(i64::MIN), None);
    }
}

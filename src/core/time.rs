//! Simulated clock arithmetic
//!
//! One tick is one minute; 1440 ticks make a day, seven days make a week.

use crate::core::types::Tick;

/// Number of simulation ticks per day
pub const TICKS_PER_DAY: Tick = 1440;

/// Number of days per week
pub const DAYS_PER_WEEK: Tick = 7;

/// Minute within the current day, in [0, 1440)
pub fn minute_of_day(tick: Tick) -> Tick {
    tick % TICKS_PER_DAY
}

/// Day within the current week, in [1, 7]
pub fn day_of_week(tick: Tick) -> Tick {
    (tick / TICKS_PER_DAY) % DAYS_PER_WEEK + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_of_day_wraps() {
        assert_eq!(minute_of_day(0), 0);
        assert_eq!(minute_of_day(1439), 1439);
        assert_eq!(minute_of_day(1440), 0);
        assert_eq!(minute_of_day(1441), 1);
    }

    #[test]
    fn test_day_of_week_cycles() {
        assert_eq!(day_of_week(0), 1);
        assert_eq!(day_of_week(1439), 1);
        assert_eq!(day_of_week(1440), 2);
        assert_eq!(day_of_week(6 * 1440), 7);
        assert_eq!(day_of_week(7 * 1440), 1);
    }
}

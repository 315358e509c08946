//! Simulated clock for the online simulator
//!
//! The simulation operates in discrete steps of one hour of calendar time.
//! A clock is created with an inclusive horizon `[start, end]`: the step at
//! time `end` is the last one that gets simulated.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Hourly simulation clock bounded by a horizon
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use txn_simulator_core_rs::SimClock;
///
/// let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(1, 0, 0).unwrap();
///
/// let mut clock = SimClock::new(start, end);
/// assert_eq!(clock.horizon_steps(), 2);
///
/// clock.advance();
/// clock.advance();
/// assert!(clock.is_past_horizon());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    /// First simulated instant
    start: NaiveDateTime,
    /// Last simulated instant (inclusive)
    end: NaiveDateTime,
    /// Steps completed since `start`
    current_step: usize,
}

impl SimClock {
    /// Create a clock positioned at `start`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            current_step: 0,
        }
    }

    /// Length of one simulation step
    pub fn step_length() -> Duration {
        Duration::hours(1)
    }

    /// Advance the clock by one step
    pub fn advance(&mut self) {
        self.current_step += 1;
    }

    /// Number of steps completed so far
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Calendar time of the step about to be simulated
    pub fn current_time(&self) -> NaiveDateTime {
        self.start + Self::step_length() * self.current_step as i32
    }

    /// Hour of day (0-23) of the current step, in global time
    pub fn hour_of_day(&self) -> u32 {
        self.current_time().hour()
    }

    /// True once every step inside the horizon has been simulated
    pub fn is_past_horizon(&self) -> bool {
        self.current_time() > self.end
    }

    /// Total number of steps inside the horizon
    ///
    /// Zero when `end` lies before `start`.
    pub fn horizon_steps(&self) -> usize {
        if self.end < self.start {
            return 0;
        }
        let span = self.end - self.start;
        (span.num_hours() as usize) + 1
    }

    /// Steps left before the clock passes the horizon
    pub fn remaining_steps(&self) -> usize {
        self.horizon_steps().saturating_sub(self.current_step)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_end_before_start_has_no_steps() {
        let clock = SimClock::new(at(2, 0), at(1, 0));
        assert_eq!(clock.horizon_steps(), 0);
        assert!(clock.is_past_horizon());
    }

    #[test]
    fn test_single_step_horizon() {
        let mut clock = SimClock::new(at(1, 5), at(1, 5));
        assert_eq!(clock.horizon_steps(), 1);
        assert!(!clock.is_past_horizon());

        clock.advance();
        assert!(clock.is_past_horizon());
        assert_eq!(clock.remaining_steps(), 0);
    }
}

//! Tests for SimClock

use chrono::{Duration, NaiveDate, NaiveDateTime};
use txn_simulator_core_rs::SimClock;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 1, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap()
}

#[test]
fn test_clock_new() {
    let clock = SimClock::new(at(1, 0), at(1, 23));
    assert_eq!(clock.current_step(), 0);
    assert_eq!(clock.current_time(), at(1, 0));
    assert_eq!(clock.hour_of_day(), 0);
    assert!(!clock.is_past_horizon());
}

#[test]
fn test_advance_moves_one_hour() {
    let mut clock = SimClock::new(at(1, 0), at(1, 23));

    clock.advance();
    assert_eq!(clock.current_step(), 1);
    assert_eq!(clock.current_time(), at(1, 1));

    clock.advance();
    assert_eq!(clock.current_time() - at(1, 0), Duration::hours(2));
}

#[test]
fn test_day_boundary() {
    let mut clock = SimClock::new(at(1, 0), at(3, 0));

    for _ in 0..23 {
        clock.advance();
    }
    assert_eq!(clock.hour_of_day(), 23);

    // Cross into Jan 2
    clock.advance();
    assert_eq!(clock.current_time(), at(2, 0));
    assert_eq!(clock.hour_of_day(), 0);
}

#[test]
fn test_horizon_is_inclusive_of_end() {
    // start and end one hour apart: two steps (00:00 and 01:00)
    let mut clock = SimClock::new(at(1, 0), at(1, 1));
    assert_eq!(clock.horizon_steps(), 2);

    clock.advance();
    assert!(!clock.is_past_horizon(), "the step at `end` is still simulated");

    clock.advance();
    assert!(clock.is_past_horizon());
    assert_eq!(clock.remaining_steps(), 0);
}

#[test]
fn test_single_instant_horizon() {
    let clock = SimClock::new(at(1, 5), at(1, 5));
    assert_eq!(clock.horizon_steps(), 1);
    assert_eq!(clock.remaining_steps(), 1);
}

#[test]
fn test_inverted_horizon_has_no_steps() {
    let clock = SimClock::new(at(2, 0), at(1, 0));
    assert_eq!(clock.horizon_steps(), 0);
    assert!(clock.is_past_horizon());
}

#[test]
fn test_default_year_horizon() {
    // 2016 is a leap year: 366 days of hourly steps
    let clock = SimClock::new(at(1, 0), NaiveDate::from_ymd_opt(2016, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 0, 0))
        .unwrap());
    assert_eq!(clock.horizon_steps(), 366 * 24);
}

#[test]
fn test_remaining_steps_counts_down() {
    let mut clock = SimClock::new(at(1, 0), at(1, 9));
    assert_eq!(clock.remaining_steps(), 10);

    for expected in (0..10).rev() {
        clock.advance();
        assert_eq!(clock.remaining_steps(), expected);
    }

    // Never underflows
    clock.advance();
    assert_eq!(clock.remaining_steps(), 0);
}

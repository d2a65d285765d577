//! Retry policy schedule and error filtering.

use std::cell::Cell;
use std::time::Duration;

use pc_price_tracker::{RetryPolicy, TrackerError};

fn not_found() -> TrackerError {
    TrackerError::PriceNotFound {
        url: "u".to_string(),
    }
}

#[test]
fn default_schedule_doubles_from_one_second() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(
        policy.delays(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
        ]
    );
}

#[test]
fn schedule_respects_cap() {
    let policy = RetryPolicy {
        max_attempts: 4,
        initial_backoff: Duration::from_millis(300),
        multiplier: 3,
        max_backoff: Some(Duration::from_secs(1)),
    };
    assert_eq!(
        policy.delays(),
        vec![
            Duration::from_millis(300),
            Duration::from_millis(900),
            Duration::from_secs(1),
        ]
    );
}

#[test]
fn single_attempt_has_no_delays() {
    assert!(RetryPolicy::immediate(1).delays().is_empty());
}

#[test]
fn retries_price_not_found_up_to_the_bound() {
    let calls = Cell::new(0);
    let result: Result<(), _> = RetryPolicy::immediate(5).run(|_| {
        calls.set(calls.get() + 1);
        Err(not_found())
    });
    assert_eq!(calls.get(), 5);
    assert!(result.unwrap_err().is_price_not_found());
}

#[test]
fn stops_at_first_success() {
    let result = RetryPolicy::immediate(5).run(|attempt| {
        if attempt < 3 {
            Err(not_found())
        } else {
            Ok(attempt)
        }
    });
    assert_eq!(result.unwrap(), 3);
}

#[test]
fn other_errors_are_not_retried() {
    let calls = Cell::new(0);
    let result: Result<(), _> = RetryPolicy::immediate(5).run(|_| {
        calls.set(calls.get() + 1);
        Err(TrackerError::HttpStatus {
            url: "u".to_string(),
            status: 503,
        })
    });
    assert_eq!(calls.get(), 1);
    assert!(result.unwrap_err().is_fetch());
}

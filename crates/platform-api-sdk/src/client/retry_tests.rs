//! Tests for retry policy.

use super::*;

#[test]
fn test_default_policy() {
    let policy = RetryPolicy::default();

    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.initial_delay, Duration::from_millis(100));
    assert_eq!(policy.max_delay, Duration::from_secs(60));
    assert_eq!(policy.backoff_multiplier, 2.0);
    assert!(policy.use_jitter);
}

#[test]
fn test_no_retry_policy() {
    let policy = RetryPolicy::no_retry();
    assert!(!policy.should_retry(0));
}

#[test]
fn test_zero_attempt_has_no_delay() {
    assert_eq!(RetryPolicy::default().calculate_delay(0), Duration::ZERO);
}

#[test]
fn test_exponential_backoff_without_jitter() {
    let policy = RetryPolicy::default().without_jitter();

    assert_eq!(policy.calculate_delay(1), Duration::from_millis(100));
    assert_eq!(policy.calculate_delay(2), Duration::from_millis(200));
    assert_eq!(policy.calculate_delay(3), Duration::from_millis(400));
    assert_eq!(policy.calculate_delay(4), Duration::from_millis(800));
}

#[test]
fn test_delay_is_capped_at_max() {
    let policy =
        RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5)).without_jitter();

    assert_eq!(policy.calculate_delay(3), Duration::from_secs(4));
    assert_eq!(policy.calculate_delay(4), Duration::from_secs(5));
    assert_eq!(policy.calculate_delay(10), Duration::from_secs(5));
}

#[test]
fn test_jitter_stays_within_bounds() {
    let policy = RetryPolicy::new(5, Duration::from_millis(1000), Duration::from_secs(60));

    for _ in 0..100 {
        let delay = policy.calculate_delay(1);
        assert!(delay >= Duration::from_millis(750), "{:?}", delay);
        assert!(delay <= Duration::from_millis(1250), "{:?}", delay);
    }
}

#[test]
fn test_with_jitter_re_enables_jitter() {
    let policy = RetryPolicy::default().without_jitter().with_jitter();
    assert!(policy.use_jitter);
}

#[test]
fn test_should_retry_respects_max_retries() {
    let policy = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_secs(1));

    assert!(policy.should_retry(0));
    assert!(policy.should_retry(1));
    assert!(!policy.should_retry(2));
    assert!(!policy.should_retry(3));
}

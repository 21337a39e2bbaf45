use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::LockoutState;

#[test]
fn test_unset_lockout_is_not_locked() {
    let now = Utc::now();
    let state = LockoutState::default();
    assert!(!state.is_locked(now));
    assert_eq!(state.remaining_minutes(now), 0);
}

#[test]
fn test_remaining_minutes_rounds_up() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let state = LockoutState {
        failed_count: 5,
        last_attempt_at: Some(now),
        lockout_until: Some(now + Duration::seconds(61)),
    };
    assert!(state.is_locked(now));
    assert_eq!(state.remaining_minutes(now), 2);
    assert_eq!(state.remaining_minutes(now + Duration::seconds(60)), 1);
}

#[test]
fn test_lockout_in_past_is_expired() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let state = LockoutState {
        failed_count: 5,
        last_attempt_at: None,
        lockout_until: Some(now),
    };
    assert!(!state.is_locked(now));
    assert!(state.has_expired_lockout(now));
    assert_eq!(state.remaining_minutes(now), 0);
}

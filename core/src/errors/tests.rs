use super::*;

#[test]
fn test_lockout_message_carries_remaining_minutes() {
    let error = DomainError::LockedOut {
        verification_type: "military".to_string(),
        remaining_minutes: 42,
    };
    assert_eq!(error.kind(), ErrorKind::RateLimited);
    assert_eq!(error.code(), "LOCKED_OUT");
    assert!(error.to_string().contains("42 minutes"));
}

#[test]
fn test_validation_errors_keep_their_own_code() {
    let error: DomainError = ValidationError::required("firstName").into();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.code(), "REQUIRED_FIELD");
    assert!(error.to_string().contains("firstName"));

    let error: DomainError = ValidationError::IneligibleEmail.into();
    assert_eq!(error.code(), "EMAIL_NOT_ELIGIBLE");
}

#[test]
fn test_only_transient_kinds_are_retryable() {
    let transient = DomainError::Transient {
        message: "timeout".to_string(),
    };
    assert!(transient.kind().is_retryable());

    let denial = DomainError::PermanentDenial {
        reason: "PERSON_NOT_FOUND".to_string(),
    };
    assert!(!denial.kind().is_retryable());
    assert!(!DomainError::configuration("missing key").kind().is_retryable());
    assert!(!DomainError::CooldownActive { remaining_seconds: 10 }
        .kind()
        .is_retryable());
}

#[test]
fn test_error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::RateLimited).unwrap();
    assert_eq!(json, "\"rate_limited\"");
}

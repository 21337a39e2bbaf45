//! Email address validation helpers

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

/// Trim and lowercase an address before it is compared or stored
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Syntactic check only; deliverability is proven by the OTP round trip
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(is_valid_email("john.smith@army.mil"));
        assert!(is_valid_email("  jane_doe-2@mail.navy.mil "));
        assert!(is_valid_email("a+tag@example.com"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.mil"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@army.mil"));
        assert!(!is_valid_email("user@.mil"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  John.Smith@ARMY.mil "), "john.smith@army.mil");
    }
}

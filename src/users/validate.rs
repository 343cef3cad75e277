use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_username(username: &str, errors: &mut Vec<FieldError>) {
    if username.len() < 5 || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(FieldError::new(
            "username",
            "must be alphanumeric and at least 5 characters",
        ));
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.is_empty() {
        errors.push(FieldError::new("password", "must not be empty"));
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
}

/// Field checks for registration. Runs before any storage access; an empty
/// result means all fields passed.
pub fn validate_registration(username: &str, password: &str, email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_username(username, &mut errors);
    check_password(password, &mut errors);
    check_email(email, &mut errors);
    errors
}

/// Field checks for profile update; only supplied fields are checked.
pub fn validate_update(password: Option<&str>, email: Option<&str>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(password) = password {
        check_password(password, &mut errors);
    }
    if let Some(email) = email {
        check_email(email, &mut errors);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_username_is_rejected() {
        let errors = validate_registration("abcd", "pw", "a@b.com");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
    }

    #[test]
    fn non_alphanumeric_username_is_rejected() {
        let errors = validate_registration("user name!", "pw", "a@b.com");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
    }

    #[test]
    fn empty_password_is_rejected() {
        let errors = validate_registration("validUser1", "", "a@b.com");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn malformed_email_is_rejected() {
        let errors = validate_registration("validUser1", "pw", "not-an-email");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn valid_fields_pass_all_checks() {
        let errors = validate_registration("validUser1", "pw", "a@b.com");
        assert!(errors.is_empty());
    }

    #[test]
    fn violations_accumulate_per_field() {
        let errors = validate_registration("abcd", "", "not-an-email");
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["username", "password", "email"]);
    }

    #[test]
    fn update_skips_absent_fields() {
        assert!(validate_update(None, None).is_empty());
        let errors = validate_update(Some(""), Some("not-an-email"));
        assert_eq!(errors.len(), 2);
    }
}

/// Input validators for registration and profile updates
///
/// Values come back trimmed on success.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 100;
const MAX_FULL_NAME_LENGTH: usize = 255;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt input limit in bytes

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    let length = trimmed.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort(
            "username".to_string(),
            MIN_USERNAME_LENGTH,
        ));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "username".to_string(),
            MAX_USERNAME_LENGTH,
        ));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

pub fn is_valid_full_name(full_name: &str) -> Result<String, ValidationError> {
    let trimmed = full_name.trim();

    if trimmed.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(ValidationError::TooLong(
            "full_name".to_string(),
            MAX_FULL_NAME_LENGTH,
        ));
    }

    // Null bytes and other control characters
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat("full_name".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Passwords are checked for length only and never trimmed
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert_eq!(is_valid_email(" a@x.com ").unwrap(), "a@x.com");
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("").is_err());
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email("user@example.c").is_err());
    }

    #[test]
    fn test_email_length_limit() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            is_valid_email(&too_long),
            Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH))
        );
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(is_valid_username(" alice_01 ").unwrap(), "alice_01");
        assert!(is_valid_username("jean-pierre.d").is_ok());
        assert!(is_valid_username("ab").is_err());
        assert!(is_valid_username(&"a".repeat(101)).is_err());
        assert!(is_valid_username("alice smith").is_err());
        assert!(is_valid_username("alice;drop").is_err());
    }

    #[test]
    fn test_full_name_rules() {
        assert_eq!(is_valid_full_name("  O'Brien ").unwrap(), "O'Brien");
        assert!(is_valid_full_name(&"a".repeat(256)).is_err());
        assert!(is_valid_full_name("Name\0with\0null").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(is_valid_password("secret123").is_ok());
        assert!(is_valid_password("short").is_err());
        assert!(is_valid_password(&"a".repeat(73)).is_err());
    }
}

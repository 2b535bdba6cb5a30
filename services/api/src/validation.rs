//! Input validation and sanitization utilities

use regex::Regex;
use sanitize_html::rules::predefined::{DEFAULT, RESTRICTED};
use sanitize_html::sanitize_str;
use std::sync::OnceLock;

/// Maximum tweet length in characters
pub const TWEET_MAX_LEN: usize = 280;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a required free-text field (titles, names, comments)
pub fn validate_required(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }

    Ok(())
}

/// Validate tweet content: trimmed non-empty, bounded length
pub fn validate_tweet_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Tweet content is required".to_string());
    }

    if content.chars().count() > TWEET_MAX_LEN {
        return Err(format!(
            "Tweet content must be at most {TWEET_MAX_LEN} characters"
        ));
    }

    Ok(())
}

/// Strip all markup from user-supplied text (comments, titles, descriptions)
pub fn sanitize_plain(input: &str) -> Result<String, String> {
    sanitize_str(&DEFAULT, input).map_err(|_| "Text contains invalid markup".to_string())
}

/// Sanitize tweet content, keeping only basic inline formatting
/// (b, i, em, strong, u)
pub fn sanitize_markup(input: &str) -> Result<String, String> {
    sanitize_str(&RESTRICTED, input).map_err(|_| "Text contains invalid markup".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_tweet_content() {
        assert!(validate_tweet_content("hello world").is_ok());
        assert!(validate_tweet_content("   ").is_err());
        assert!(validate_tweet_content(&"x".repeat(281)).is_err());
        assert!(validate_tweet_content(&"x".repeat(280)).is_ok());
    }

    #[test]
    fn test_sanitize_plain_strips_tags() {
        let out = sanitize_plain("<script>alert(1)</script>hello <b>there</b>").unwrap();
        assert!(!out.contains("<script>"));
        assert!(!out.contains("<b>"));
        assert!(out.contains("hello"));
    }

    #[test]
    fn test_sanitize_markup_keeps_inline_formatting() {
        let out = sanitize_markup("stay <b>bold</b><script>alert(1)</script>").unwrap();
        assert!(out.contains("<b>bold</b>"));
        assert!(!out.contains("<script>"));
    }
}

//! Team validation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Invalid team ID: {0}")]
    InvalidId(String),

    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team tag cannot be empty")]
    EmptyTag,

    #[error("Team tag cannot exceed {0} characters")]
    TagTooLong(usize),

    #[error("Team tag can only contain alphanumeric characters")]
    InvalidTagCharacters,

    #[error("Unknown league '{0}'")]
    UnknownLeague(String),
}

const MAX_TEAM_NAME_LENGTH: usize = 64;

/// Default upper bound for team tags
pub const DEFAULT_TAG_MAX_LENGTH: usize = 5;

/// Widest tag the `teams.tag` column can hold
pub const TAG_STORAGE_LIMIT: usize = 16;

/// Tags are plain ASCII letters and digits
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a team tag against the configured length limit
pub fn validate_team_tag(tag: &str, max_length: usize) -> Result<(), TeamValidationError> {
    if tag.is_empty() {
        return Err(TeamValidationError::EmptyTag);
    }

    if tag.chars().count() > max_length {
        return Err(TeamValidationError::TagTooLong(max_length));
    }

    if !TAG_PATTERN.is_match(tag) {
        return Err(TeamValidationError::InvalidTagCharacters);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team_name() {
        assert!(validate_team_name("Falcons").is_ok());
        assert!(validate_team_name("Team with spaces & symbols!").is_ok());
    }

    #[test]
    fn test_empty_team_name() {
        assert_eq!(validate_team_name(""), Err(TeamValidationError::EmptyName));
        assert_eq!(validate_team_name("  "), Err(TeamValidationError::EmptyName));
    }

    #[test]
    fn test_team_name_too_long() {
        let long_name = "a".repeat(65);
        assert_eq!(
            validate_team_name(&long_name),
            Err(TeamValidationError::NameTooLong(64))
        );
    }

    #[test]
    fn test_valid_tags() {
        assert!(validate_team_tag("FLC", 5).is_ok());
        assert!(validate_team_tag("T1", 5).is_ok());
        assert!(validate_team_tag("ABCDE", 5).is_ok());
    }

    #[test]
    fn test_tag_over_limit() {
        assert_eq!(
            validate_team_tag("ABCDEF", 5),
            Err(TeamValidationError::TagTooLong(5))
        );
        assert!(validate_team_tag("ABCDEF", 6).is_ok());
    }

    #[test]
    fn test_tag_characters() {
        assert_eq!(validate_team_tag("", 5), Err(TeamValidationError::EmptyTag));
        assert_eq!(
            validate_team_tag("F-C", 5),
            Err(TeamValidationError::InvalidTagCharacters)
        );
        assert_eq!(
            validate_team_tag("ÉQP", 5),
            Err(TeamValidationError::InvalidTagCharacters)
        );
    }
}

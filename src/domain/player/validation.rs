//! Player validation

use thiserror::Error;

/// Errors that can occur during player validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayerValidationError {
    #[error("Player handle cannot be empty")]
    EmptyHandle,

    #[error("Player handle cannot exceed {0} characters")]
    HandleTooLong(usize),

    #[error("Player handle cannot contain whitespace")]
    HandleWhitespace,

    #[error("Nickname cannot be empty")]
    EmptyNickname,

    #[error("Nickname cannot exceed {0} characters")]
    NicknameTooLong(usize),

    #[error("Bio cannot exceed {0} characters")]
    BioTooLong(usize),

    #[error("Unknown lane role '{0}'")]
    UnknownLane(String),
}

const MAX_HANDLE_LENGTH: usize = 64;
/// Platforms cap display names at this length
pub const MAX_NICKNAME_LENGTH: usize = 32;
const MAX_BIO_LENGTH: usize = 100;

/// Validate a platform user handle
pub fn validate_player_handle(handle: &str) -> Result<(), PlayerValidationError> {
    if handle.is_empty() {
        return Err(PlayerValidationError::EmptyHandle);
    }

    if handle.chars().count() > MAX_HANDLE_LENGTH {
        return Err(PlayerValidationError::HandleTooLong(MAX_HANDLE_LENGTH));
    }

    if handle.chars().any(char::is_whitespace) {
        return Err(PlayerValidationError::HandleWhitespace);
    }

    Ok(())
}

/// Validate a display nickname
pub fn validate_nickname(nickname: &str) -> Result<(), PlayerValidationError> {
    if nickname.trim().is_empty() {
        return Err(PlayerValidationError::EmptyNickname);
    }

    if nickname.chars().count() > MAX_NICKNAME_LENGTH {
        return Err(PlayerValidationError::NicknameTooLong(MAX_NICKNAME_LENGTH));
    }

    Ok(())
}

/// Validate a profile bio
pub fn validate_bio(bio: &str) -> Result<(), PlayerValidationError> {
    if bio.chars().count() > MAX_BIO_LENGTH {
        return Err(PlayerValidationError::BioTooLong(MAX_BIO_LENGTH));
    }

    Ok(())
}

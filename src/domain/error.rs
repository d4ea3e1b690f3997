use thiserror::Error;

/// Which uniqueness rule a conflicting request ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Team name is used by another team, active or archived
    NameTaken,
    /// Team tag is used by another team, active or archived
    TagTaken,
    /// An active invite already exists for the (team, invitee) pair
    DuplicateInvite,
    /// The platform handle is already registered
    AlreadyRegistered,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTaken => write!(f, "name_taken"),
            Self::TagTaken => write!(f, "tag_taken"),
            Self::DuplicateInvite => write!(f, "duplicate_invite"),
            Self::AlreadyRegistered => write!(f, "already_registered"),
        }
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { kind: ConflictKind, message: String },

    #[error("Already in team: {message}")]
    AlreadyInTeam { message: String },

    #[error("Not in team: {message}")]
    NotInTeam { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Already decided: {message}")]
    AlreadyDecided { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            message: message.into(),
        }
    }

    pub fn already_in_team(message: impl Into<String>) -> Self {
        Self::AlreadyInTeam {
            message: message.into(),
        }
    }

    pub fn not_in_team(message: impl Into<String>) -> Self {
        Self::NotInTeam {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn already_decided(message: impl Into<String>) -> Self {
        Self::AlreadyDecided {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors the caller caused; anything else is an unexpected fault
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            Self::Configuration { .. } | Self::Storage { .. } | Self::Internal { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Player '42' not found");
        assert_eq!(error.to_string(), "Not found: Player '42' not found");
    }

    #[test]
    fn test_conflict_error_keeps_kind() {
        let error = DomainError::conflict(ConflictKind::TagTaken, "Tag 'FLC' is taken");
        assert_eq!(error.to_string(), "Conflict: Tag 'FLC' is taken");
        assert!(matches!(
            error,
            DomainError::Conflict {
                kind: ConflictKind::TagTaken,
                ..
            }
        ));
    }

    #[test]
    fn test_domain_classification() {
        assert!(DomainError::already_in_team("x").is_domain());
        assert!(DomainError::permission_denied("x").is_domain());
        assert!(!DomainError::storage("x").is_domain());
        assert!(!DomainError::internal("x").is_domain());
    }
}

use serde::Serialize;

use super::PlatformError;

/// Platform step that could not be reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    GrantRole,
    RevokeRole,
    SetNickname,
    ClearNickname,
    Notify,
    ProvisionSpace,
    DeprovisionSpace,
}

/// A committed change whose platform mirror is out of date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncWarning {
    pub step: SyncStep,
    pub message: String,
}

impl SyncWarning {
    pub fn new(step: SyncStep, error: &PlatformError) -> Self {
        Self {
            step,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "database updated, but {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_message() {
        let warning = SyncWarning::new(
            SyncStep::GrantRole,
            &PlatformError::MemberNotFound("42".to_string()),
        );

        assert_eq!(warning.step, SyncStep::GrantRole);
        assert_eq!(
            warning.to_string(),
            "database updated, but member '42' is not present on the platform"
        );
    }
}

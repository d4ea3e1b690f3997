//! Moderator approval policy for invites

use crate::domain::invite::Invite;

/// Decides whether a freshly created invite needs a moderator's sign-off
///
/// Only consulted when an invite is created; later transitions never ask
/// again, so toggling the flag leaves in-flight invites untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalGate {
    approval_required: bool,
}

impl ApprovalGate {
    pub fn new(approval_required: bool) -> Self {
        Self { approval_required }
    }

    pub fn approval_required(&self) -> bool {
        self.approval_required
    }

    pub fn requires_sign_off(&self, invite: &Invite) -> bool {
        self.approval_required && invite.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::PlayerId;
    use crate::domain::team::TeamId;
    use chrono::{Duration, Utc};

    fn invite() -> Invite {
        Invite::new(
            TeamId::generate(),
            PlayerId::new("captain").unwrap(),
            PlayerId::new("rookie").unwrap(),
            Utc::now(),
            Duration::days(7),
        )
    }

    #[test]
    fn test_gate_enabled() {
        let gate = ApprovalGate::new(true);
        assert!(gate.requires_sign_off(&invite()));
    }

    #[test]
    fn test_gate_disabled() {
        let gate = ApprovalGate::new(false);
        assert!(!gate.requires_sign_off(&invite()));
    }

    #[test]
    fn test_decided_invite_needs_no_sign_off() {
        let gate = ApprovalGate::new(true);
        let mut invite = invite();
        invite.approve(PlayerId::new("mod").unwrap(), Utc::now(), Duration::days(7));

        assert!(!gate.requires_sign_off(&invite));
    }
}

//! Roster services
//!
//! Each service owns one slice of the command surface; the
//! [`CommandDispatcher`] is the only type the API layer talks to.

mod dispatcher;
mod invite_service;
mod membership;
mod platform_sync;
mod player_service;
mod team_service;
mod transfer_ledger;

pub use dispatcher::CommandDispatcher;
pub use invite_service::{Decider, InviteWorkflow};
pub use membership::MembershipSynchronizer;
pub use platform_sync::PlatformSync;
pub use player_service::{PlayerService, UpdateProfileRequest};
pub use team_service::TeamRegistry;
pub use transfer_ledger::TransferLedger;

//! Domain layer - Core roster entities, rules and ports

pub mod approval;
pub mod command;
pub mod error;
pub mod invite;
pub mod platform;
pub mod player;
pub mod store;
pub mod team;
pub mod transfer;

pub use approval::ApprovalGate;
pub use command::{Command, CommandContext, CommandOutcome, CommandReply, InviteView};
pub use error::{ConflictKind, DomainError};
pub use invite::{Invite, InviteId, InviteRepository, InviteStatus};
pub use platform::{PlatformDirectory, PlatformError, SyncStep, SyncWarning};
pub use player::{LaneRole, Player, PlayerId, PlayerRepository};
pub use store::{RosterStore, RosterTransaction};
pub use team::{League, Team, TeamId, TeamQuery, TeamRepository};
pub use transfer::{Transfer, TransferId, TransferKind, TransferRepository};

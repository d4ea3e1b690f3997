//! Team domain module
//!
//! Teams are archived, never removed, so ledger entries keep pointing at a
//! resolvable row. Captain and members reference each other by id only.

mod entity;
mod repository;
mod validation;

pub use entity::{normalize_tag, League, Team, TeamId};
pub use repository::{TeamQuery, TeamRepository};
pub use validation::{
    validate_team_name, validate_team_tag, TeamValidationError, DEFAULT_TAG_MAX_LENGTH,
    TAG_STORAGE_LIMIT,
};

//! Player domain module
//!
//! A player is a registered platform user. Team membership lives on the
//! player row and is the single source of truth for "who is on which team".

mod entity;
mod repository;
mod validation;

pub use entity::{LaneRole, Player, PlayerId};
pub use repository::PlayerRepository;
pub use validation::{
    validate_bio, validate_nickname, validate_player_handle, PlayerValidationError,
    MAX_NICKNAME_LENGTH,
};

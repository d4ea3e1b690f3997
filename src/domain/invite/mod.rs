//! Invite domain module

mod entity;
mod repository;

pub use entity::{Invite, InviteId, InviteStatus};
pub use repository::InviteRepository;

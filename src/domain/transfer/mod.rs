//! Transfer ledger domain module

mod entity;
mod repository;

pub use entity::{Transfer, TransferId, TransferKind};
pub use repository::TransferRepository;

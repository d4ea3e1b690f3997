//! API middleware components

pub mod actor;
pub mod logging;

pub use actor::{Actor, ACTOR_HEADER, REQUEST_ID_HEADER};
pub use logging::logging_middleware;

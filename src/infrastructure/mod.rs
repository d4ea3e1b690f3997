//! Infrastructure layer - storage backends, platform clients and services

pub mod logging;
pub mod platform;
pub mod services;
pub mod storage;

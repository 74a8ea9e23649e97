//! Dripfy dashboard API client

pub mod api;
pub mod dripfy;
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::{ApprovalApi, AuditApi};
pub use dripfy::{DEFAULT_API_BASE, DripfyClient};
#[cfg(test)]
pub use mock::MockDripfyClient;

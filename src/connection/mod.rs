//! Connection management for querydesk.
//!
//! Centralizes the lifecycle of the single live session.

pub mod manager;

pub use manager::{ActiveConnection, ConnectionManager};

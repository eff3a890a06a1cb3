//! Integration tests for the database gateway and session controller.

pub mod connection_test;
pub mod query_test;
pub mod session_test;

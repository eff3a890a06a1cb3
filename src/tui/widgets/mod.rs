//! TUI widgets for querydesk.

pub mod header;
pub mod input;
pub mod spinner;
pub mod status;
pub mod table;

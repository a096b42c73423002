//! CLI library components for the ACE translator.

pub mod commands;
pub mod logging;
pub mod types;

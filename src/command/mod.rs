//! Command classification: transcript text to intent.

pub mod matcher;

pub use matcher::{CommandMatcher, CommandPattern, Intent, default_command_table};

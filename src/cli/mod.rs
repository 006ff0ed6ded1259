//! Command-line interface.

pub mod args;
pub mod cooldowns;
pub mod select;
pub mod skip;
pub mod usage;

pub use args::{Cli, Commands};

//! Command-line interface module.

mod args;
pub mod aggregate;
pub mod batch;

pub use args::{AggregateArgs, BatchArgs, Cli, Commands};

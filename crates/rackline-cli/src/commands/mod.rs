//! CLI command implementations.

pub mod common;
pub mod monitor;
pub mod order;
pub mod plugins;

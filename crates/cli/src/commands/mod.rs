//! Subcommand implementations, one module per account source.

pub mod cloudvps;
pub mod optout;
pub mod toolforge;

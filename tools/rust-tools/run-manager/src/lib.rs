//! Library side of `run-manager`: the subcommands and the training engine
//! they hand runs off to.

pub mod commands;
pub mod engine;

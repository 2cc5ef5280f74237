mod command;

pub mod sync;
pub mod train;

pub use command::Command;

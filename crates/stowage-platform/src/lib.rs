pub use command::{Command, Invocation, SystemRunner, ToolOutput, ToolRunner};
pub use error::{Error, Result};
pub use probe::ToolProbe;

pub mod command;
mod error;
pub mod probe;

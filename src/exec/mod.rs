mod queue;
mod runner;

pub use queue::ExecQueue;
pub use runner::{CommandRunner, ExecOutput, Invocation, SystemRunner};

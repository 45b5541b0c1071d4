// Module declarations in dependency order
pub mod core;
pub mod exec;
pub mod processing;
pub mod utils;

// Public exports for external consumers
pub use core::{
    OptimizationResult, OptimizeOptions, OptimizeStatus, OptimizerConfig, ProcessOptions, Quality,
};
pub use exec::{CommandRunner, ExecOutput, ExecQueue, Invocation, SystemRunner};
pub use processing::Optimizer;
pub use utils::{OptimizerError, OptimizerResult};

// This library file is the public API for consuming this crate as a library.
// The CLI entry point is in main.rs.

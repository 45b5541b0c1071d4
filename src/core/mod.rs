//! Core configuration and result types.
//!
//! - [`OptimizerConfig`]: binary locations and the concurrency limit
//! - [`ProcessOptions`] / [`OptimizeOptions`]: per-run knobs
//! - [`OptimizeStatus`] / [`OptimizationResult`]: outcomes

mod types;

pub use types::{
    OptimizationResult, OptimizeOptions, OptimizeStatus, OptimizerConfig, ProcessOptions, Quality,
};

pub mod error;
pub mod fs;

pub use error::{OptimizerError, OptimizerResult};
pub use fs::{file_exists, get_file_size, move_file, random_output_path};

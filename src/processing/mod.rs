pub(crate) mod exiftool;
pub(crate) mod jpegmini;
mod optimizer;

pub use optimizer::Optimizer;

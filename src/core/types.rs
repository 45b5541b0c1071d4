//! Core types for optimizer configuration and results.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality tier passed to the optimizer binary's `-qual` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Best quality, least compression (`-qual=0`)
    #[default]
    Best,
    /// High quality (`-qual=1`)
    High,
    /// Medium quality, most compression (`-qual=2`)
    Medium,
}

impl Quality {
    pub(crate) fn flag_value(self) -> u8 {
        match self {
            Quality::Best => 0,
            Quality::High => 1,
            Quality::Medium => 2,
        }
    }
}

/// Options for a single run of the optimizer binary.
///
/// Maps one-to-one onto the binary's CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Input file or directory (`-f`)
    pub input: PathBuf,
    /// Output path (`-o`); in-place when omitted
    pub output: Option<PathBuf>,
    /// Recurse into directories (`-r`, on by default)
    pub recurse: bool,
    /// Quality tier (`-qual`)
    pub quality: Quality,
    /// Resize longest edge to this many pixels (`-rsz`)
    pub resize: Option<u32>,
    /// Skip files the binary judges already compressed (`-shc`)
    pub skip_compressed: bool,
    /// Strip metadata from the output (`-rmt`)
    pub remove_metadata: bool,
    /// License cache path (`-lc`)
    pub license_cache: Option<PathBuf>,
}

impl ProcessOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            recurse: true,
            quality: Quality::default(),
            resize: None,
            skip_compressed: false,
            remove_metadata: false,
            license_cache: None,
        }
    }
}

/// Options for the in-place [`optimize`](crate::Optimizer::optimize) flow,
/// which generates its own temp output path under `tmp_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeOptions {
    /// Directory for temporary optimizer output
    pub tmp_dir: PathBuf,
    pub quality: Quality,
    pub resize: Option<u32>,
    pub skip_compressed: bool,
    pub remove_metadata: bool,
    pub license_cache: Option<PathBuf>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from("/tmp"),
            quality: Quality::default(),
            resize: None,
            skip_compressed: false,
            remove_metadata: false,
            license_cache: None,
        }
    }
}

/// Outcome of an in-place optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeStatus {
    /// The file was optimized and replaced
    Optimized,
    /// The file already carried the optimized tag and was left untouched
    AlreadyOptimized,
}

/// Wrapper configuration: where the binaries live and how many may run at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Optimizer binary name or path
    pub jpegmini_bin: String,
    /// Metadata-inspection binary name or path
    pub exiftool_bin: String,
    /// Maximum simultaneous external-process invocations
    pub concurrency: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            jpegmini_bin: "jpegmini".to_string(),
            exiftool_bin: "exiftool".to_string(),
            concurrency: 1,
        }
    }
}

/// Per-file summary of an optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// Path of the optimized file
    pub path: String,
    /// File size before optimization in bytes
    pub original_size: u64,
    /// File size after optimization in bytes
    pub optimized_size: u64,
    /// Bytes saved (can be negative if the file grew)
    #[serde(rename = "savedBytes")]
    pub saved_bytes: i64,
    /// Compression ratio as a percentage
    #[serde(rename = "compressionRatio")]
    pub compression_ratio: f64,
    /// Whether work happened or the file was already tagged
    pub status: OptimizeStatus,
}

impl OptimizationResult {
    pub fn new(path: String, original_size: u64, optimized_size: u64, status: OptimizeStatus) -> Self {
        let saved_bytes = original_size as i64 - optimized_size as i64;
        let compression_ratio = if original_size > 0 {
            (saved_bytes as f64 / original_size as f64) * 100.0
        } else {
            0.0
        };
        Self {
            path,
            original_size,
            optimized_size,
            saved_bytes,
            compression_ratio,
            status,
        }
    }
}

// CLI entry point: optimize JPEGs in place through the optimizer binary,
// or log out a license cache.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jpegmini::utils::get_file_size;
use jpegmini::{
    OptimizationResult, OptimizeOptions, OptimizeStatus, Optimizer, OptimizerConfig, Quality,
};

#[derive(Parser, Debug)]
#[command(
    name = "jpegmini-opt",
    version,
    about = "Optimize JPEG images in place via the JPEGmini CLI"
)]
struct Cli {
    /// Images to optimize in place
    #[arg(required_unless_present = "logout")]
    paths: Vec<PathBuf>,

    /// Quality tier
    #[arg(long, value_enum, default_value_t = Quality::Best)]
    quality: Quality,

    /// Maximum simultaneous optimizer invocations
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Directory for temporary optimizer output
    #[arg(long, default_value = "/tmp")]
    tmp_dir: PathBuf,

    /// Resize the longest edge to this many pixels
    #[arg(long)]
    resize: Option<u32>,

    /// Let the binary skip files it judges already compressed
    #[arg(long)]
    skip_compressed: bool,

    /// Strip metadata from optimized files
    #[arg(long)]
    remove_metadata: bool,

    /// License cache path handed to the binary
    #[arg(long)]
    license_cache: Option<PathBuf>,

    /// Optimizer binary name or path
    #[arg(long, default_value = "jpegmini")]
    jpegmini_bin: String,

    /// Metadata binary name or path
    #[arg(long, default_value = "exiftool")]
    exiftool_bin: String,

    /// Log out the license cache at this path and exit
    #[arg(long, value_name = "CACHE")]
    logout: Option<PathBuf>,

    /// Emit per-file results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = OptimizerConfig {
        jpegmini_bin: cli.jpegmini_bin.clone(),
        exiftool_bin: cli.exiftool_bin.clone(),
        concurrency: cli.concurrency,
    };
    let optimizer = Optimizer::new(config);

    if let Some(cache) = &cli.logout {
        optimizer.logout(cache).await.context("Logout failed")?;
        info!("Logged out license cache {}", cache.display());
        return Ok(());
    }

    let opts = OptimizeOptions {
        tmp_dir: cli.tmp_dir.clone(),
        quality: cli.quality,
        resize: cli.resize,
        skip_compressed: cli.skip_compressed,
        remove_metadata: cli.remove_metadata,
        license_cache: cli.license_cache.clone(),
    };

    // The queue inside the optimizer bounds actual binary invocations, so all
    // files can be submitted at once.
    let mut jobs = Vec::with_capacity(cli.paths.len());
    for path in &cli.paths {
        let optimizer = optimizer.clone();
        let opts = opts.clone();
        let path = path.clone();
        jobs.push(tokio::spawn(async move {
            let original_size = get_file_size(&path).await?;
            let status = optimizer.optimize(&path, &opts).await?;
            let optimized_size = get_file_size(&path).await?;
            Ok(OptimizationResult::new(
                path.display().to_string(),
                original_size,
                optimized_size,
                status,
            ))
        }));
    }

    let mut results = Vec::new();
    let mut failures = 0usize;
    for (path, job) in cli.paths.iter().zip(futures::future::join_all(jobs).await) {
        let outcome: jpegmini::OptimizerResult<OptimizationResult> =
            job.context("Optimization task panicked")?;
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            match result.status {
                OptimizeStatus::Optimized => info!(
                    "{}: {} -> {} bytes ({:.1}% saved)",
                    result.path, result.original_size, result.optimized_size, result.compression_ratio
                ),
                OptimizeStatus::AlreadyOptimized => {
                    info!("{}: already optimized, skipped", result.path)
                }
            }
        }
    }

    if failures > 0 {
        bail!("{} file(s) failed to optimize", failures);
    }
    Ok(())
}

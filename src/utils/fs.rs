use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::utils::{OptimizerError, OptimizerResult};

/// Get file size in bytes
pub async fn get_file_size(path: impl AsRef<Path>) -> OptimizerResult<u64> {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.len())
        .map_err(|e| OptimizerError::io(format!("Failed to get file size: {}", e)))
}

/// Check if file exists
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref()).await.is_ok()
}

/// Move a file, falling back to copy + delete when the rename crosses filesystems.
///
/// The optimizer writes its output to a temp directory which may live on a
/// different device than the final destination; a plain rename fails with
/// `CrossesDevices` in that case. Any other rename error propagates unchanged.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> OptimizerResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Rename {} -> {} crossed devices, falling back to copy",
                src.display(),
                dst.display()
            );
            copy_then_remove(src, dst).await
        }
        Err(e) => Err(OptimizerError::io(format!(
            "Failed to move {} -> {}: {}",
            src.display(),
            dst.display(),
            e
        ))),
    }
}

/// Copy `src` to `dst`, then delete `src`.
///
/// The source is removed best-effort whether or not the copy succeeded; a
/// failed copy must not leave the temp file behind.
async fn copy_then_remove(src: &Path, dst: &Path) -> OptimizerResult<()> {
    let copied = fs::copy(src, dst).await;

    if let Err(e) = fs::remove_file(src).await {
        warn!("Failed to remove temp file {}: {}", src.display(), e);
    }

    copied
        .map(|_| ())
        .map_err(|e| OptimizerError::io(format!(
            "Failed to copy {} -> {}: {}",
            src.display(),
            dst.display(),
            e
        )))
}

/// Random `.jpg` output path inside `tmp_dir` for a single optimizer run.
pub fn random_output_path(tmp_dir: impl AsRef<Path>) -> PathBuf {
    tmp_dir.as_ref().join(format!("{}.jpg", Uuid::new_v4().simple()))
}

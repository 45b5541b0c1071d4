//! Comment-tag handling via the metadata-inspection binary.
//!
//! The desktop optimizer marks processed files through the JPEG comment field;
//! the server binary does not, so this wrapper reads (and can write) the tag
//! itself with exiftool.

use std::path::Path;

/// Substring that marks a file as already optimized (matched case-insensitively).
pub(crate) const OPTIMIZED_MARKER: &str = "jpegmini";

/// Comment written by [`mark_optimized`](crate::Optimizer::mark_optimized).
const OPTIMIZED_COMMENT: &str = "Optimized by JPEGmini";

pub(crate) fn read_comment_args(path: &Path) -> Vec<String> {
    vec!["-comment".to_string(), path.display().to_string()]
}

pub(crate) fn write_comment_args(path: &Path) -> Vec<String> {
    vec![
        format!("-comment={}", OPTIMIZED_COMMENT),
        "-overwrite_original".to_string(),
        path.display().to_string(),
    ]
}

/// Whether exiftool's comment output says the file was already processed.
pub(crate) fn comment_marks_optimized(stdout: &str) -> bool {
    stdout.to_lowercase().contains(OPTIMIZED_MARKER)
}

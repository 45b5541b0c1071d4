//! Flag construction for the optimizer binary.

use std::path::Path;
use crate::core::ProcessOptions;

/// Error code the binary prints when a logout-only invocation finds no active
/// license session. Treated as success by [`Optimizer::logout`](crate::Optimizer::logout).
pub(crate) const LOGOUT_LICENSE_CODE: &str = "7032";

/// The binary refuses to run without `-f`, even for a logout-only invocation.
const LOGOUT_PLACEHOLDER_INPUT: &str = "/tmp/_.jpg";

/// Builds the argv for a processing run. Flag order matches the binary's
/// documented CLI layout.
pub(crate) fn process_args(opts: &ProcessOptions) -> Vec<String> {
    let mut args = Vec::new();
    args.push(format!("-f={}", opts.input.display()));
    if let Some(output) = &opts.output {
        args.push(format!("-o={}", output.display()));
    }
    args.push(format!("-r={}", if opts.recurse { 1 } else { 0 }));
    if let Some(cache) = &opts.license_cache {
        args.push(format!("-lc={}", cache.display()));
    }
    if let Some(resize) = opts.resize {
        args.push(format!("-rsz={}", resize));
    }
    args.push(format!("-qual={}", opts.quality.flag_value()));
    if opts.skip_compressed {
        args.push("-shc=1".to_string());
    }
    if opts.remove_metadata {
        args.push("-rmt=1".to_string());
    }
    args
}

/// Builds the argv for logging out a license cache.
pub(crate) fn logout_args(cache_path: &Path) -> Vec<String> {
    vec![
        format!("-lc_logout={}", cache_path.display()),
        format!("-f={}", LOGOUT_PLACEHOLDER_INPUT),
    ]
}

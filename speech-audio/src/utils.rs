//! Shared audio utilities.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic-ish timestamp in milliseconds since UNIX epoch.
#[inline]
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Resolve a binary from an env override, falling back to `PATH`.
pub(crate) fn get_from_env_or_path(env_key: &str, default_bin: &str) -> Option<PathBuf> {
    if let Ok(p) = std::env::var(env_key) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Some(pb);
        }
    }
    get_from_path(default_bin)
}

pub(crate) fn get_from_path(bin: &str) -> Option<PathBuf> {
    // If a path-like string is provided, respect it directly
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(bin);
        return if p.exists() { Some(p) } else { None };
    }

    if let Some(paths_os) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths_os) {
            let candidate = dir.join(bin);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

//! Choosing where report files are written.

use std::path::{Path, PathBuf};

use log::debug;

/// Returns `path` if it is a writable directory, otherwise the user's home
/// folder, otherwise the system temp directory.
#[must_use]
pub fn get_valid_output_path(path: &Path) -> PathBuf {
    if is_writable_dir(path) {
        return path.to_path_buf();
    }

    let home = ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(std::env::var_os)
        .map(PathBuf::from)
        .find(|dir| is_writable_dir(dir));
    let fallback = home.unwrap_or_else(std::env::temp_dir);
    debug!(
        "'{}' is not a writable directory, using {}",
        path.display(),
        fallback.display()
    );
    fallback
}

/// Probes `dir` by creating (and immediately removing) an anonymous file in it.
fn is_writable_dir(dir: &Path) -> bool {
    dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
}

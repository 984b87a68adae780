//! Locates the directory holding default content, context and config files.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// Construct a path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// The resolved data root.
pub fn data_root() -> &'static Path {
    &DATA_ROOT
}

fn detect_data_root() -> PathBuf {
    let mut candidates = vec![PathBuf::from("alcove_engine/data"), PathBuf::from("data")];

    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("alcove_engine/data"));
        candidates.push(dir.join("data"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("alcove_engine/data"));
            candidates.push(parent.join("data"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.join("content.ron").is_file())
        .unwrap_or_else(|| PathBuf::from("alcove_engine/data"))
}

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

/// Stable `/`-separated key for a path, without leading `./` components.
#[must_use]
pub fn path_to_key(path: &Path) -> String {
    let without_current_directory: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    let key = without_current_directory
        .to_string_lossy()
        .replace('\\', "/");
    if key.is_empty() { ".".to_string() } else { key }
}

#[must_use]
pub fn compare_paths(left: &Path, right: &Path) -> Ordering {
    path_to_key(left).cmp(&path_to_key(right))
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compiler__diagnostics::Diagnostic;
use compiler__source::{compare_paths, path_to_key};
use tracing::debug;
use walkdir::WalkDir;

use crate::PathFilter;
use crate::documents::{io_diagnostic, load_diagnostic};

/// Appends every regular file below `directory` to `files`, in sorted path order.
///
/// Symlinks are followed. Dangling links and links back to an enclosing
/// directory are skipped. Ignored directories are not entered.
pub(crate) fn collect_files(
    directory: &Path,
    filter: &PathFilter,
    files: &mut Vec<PathBuf>,
    errors: &mut Vec<Diagnostic>,
) {
    let walker = WalkDir::new(directory)
        .follow_links(true)
        .sort_by(|left, right| compare_paths(left.path(), right.path()))
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !filter.should_ignore(entry.path()));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(error) => {
                let path = error.path().unwrap_or(directory).to_path_buf();
                if let Some(ancestor) = error.loop_ancestor() {
                    debug!(
                        path = %path.display(),
                        ancestor = %ancestor.display(),
                        "skipping symlink cycle"
                    );
                    continue;
                }
                match error.into_io_error() {
                    Some(io_error)
                        if io_error.kind() == ErrorKind::NotFound && path != directory =>
                    {
                        debug!(path = %path.display(), "skipping dangling symlink");
                    }
                    Some(io_error) => errors.push(io_diagnostic(&path_to_key(&path), &io_error)),
                    None => {
                        errors.push(load_diagnostic(&path_to_key(&path), &"unreadable entry"));
                    }
                }
            }
        }
    }
}

use std::fs;
use std::path::Path;

use compiler__diagnostics::{Diagnostic, LoadFailure};
use compiler__source::{SourceKind, path_to_key};
use compiler__syntax::Module;
use tracing::debug;

use crate::PathFilter;
use crate::documents::{Document, io_diagnostic, load_diagnostic, load_document};
use crate::walk::collect_files;

#[derive(Debug)]
pub struct LoadedModule {
    /// Path the module was loaded from, as a `/`-separated key.
    pub name: String,
    pub module: Module,
}

#[derive(Debug, Default)]
pub struct LoadResult {
    pub modules: Vec<LoadedModule>,
    /// Data documents that were read and validated.
    pub data_files: Vec<String>,
}

/// Loads policy modules and data documents below each path, skipping ignored names.
///
/// Every unreadable or malformed file is reported; nothing is returned unless all load.
pub fn load_filtered<P: AsRef<Path>>(
    paths: &[P],
    filter: &PathFilter,
) -> Result<LoadResult, LoadFailure> {
    let mut result = LoadResult::default();
    let mut errors = Vec::new();

    for root in paths {
        let root = root.as_ref();
        if filter.should_ignore(root) {
            debug!(path = %root.display(), "ignored");
            continue;
        }
        let metadata = match fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(error) => {
                errors.push(io_diagnostic(&path_to_key(root), &error));
                continue;
            }
        };

        if metadata.is_dir() {
            let mut files = Vec::new();
            collect_files(root, filter, &mut files, &mut errors);
            for file in files {
                if let Some(kind) = SourceKind::from_path(&file) {
                    load_into(&file, kind, &mut result, &mut errors);
                }
            }
        } else {
            // Files named explicitly must be loadable.
            match SourceKind::from_path(root) {
                Some(kind) => load_into(root, kind, &mut result, &mut errors),
                None => errors.push(load_diagnostic(
                    &path_to_key(root),
                    &"unrecognized file extension",
                )),
            }
        }
    }

    debug!(
        modules = result.modules.len(),
        data_files = result.data_files.len(),
        errors = errors.len(),
        "loaded paths"
    );
    if errors.is_empty() {
        Ok(result)
    } else {
        Err(LoadFailure::new(errors))
    }
}

fn load_into(path: &Path, kind: SourceKind, result: &mut LoadResult, errors: &mut Vec<Diagnostic>) {
    let key = path_to_key(path);
    match load_document(path, &key, kind) {
        Ok(Document::Policy(module)) => result.modules.push(LoadedModule { name: key, module }),
        Ok(Document::Data) => result.data_files.push(key),
        Err(diagnostics) => errors.extend(diagnostics),
    }
}

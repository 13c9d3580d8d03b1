use std::fs;
use std::path::{Path, PathBuf};

use compiler__diagnostics::{Diagnostic, LoadFailure};
use compiler__source::{BUNDLE_MANIFEST_FILE_NAME, SourceKind, path_to_key};
use compiler__syntax::Module;
use serde::Deserialize;
use tracing::debug;

use crate::PathFilter;
use crate::archive::read_archive;
use crate::documents::{Document, io_diagnostic, load_diagnostic, parse_document};
use crate::walk::collect_files;

/// Contents of a bundle's `.manifest` file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub revision: String,
    /// Package path prefixes, `/`-separated, the bundle may define.
    #[serde(default)]
    pub roots: Option<Vec<String>>,
}

impl Manifest {
    fn permits(&self, path: &str) -> bool {
        let Some(roots) = &self.roots else {
            return true;
        };
        roots.iter().any(|root| {
            let root = root.trim_matches('/');
            root.is_empty()
                || path == root
                || path
                    .strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn describe_roots(&self) -> String {
        format!("[{}]", self.roots.as_deref().unwrap_or_default().join(" "))
    }
}

#[derive(Debug)]
pub struct BundleModule {
    /// `/` followed by the module's path relative to the bundle root.
    pub path: String,
    pub module: Module,
}

#[derive(Debug)]
pub struct Bundle {
    pub root: PathBuf,
    pub manifest: Manifest,
    pub modules: Vec<BundleModule>,
}

/// A bundle member worth reading: a policy, a data document or the manifest.
pub(crate) struct BundleFile {
    /// `/`-separated path relative to the bundle root, without a leading `/`.
    pub(crate) relative: String,
    pub(crate) text: String,
}

/// Loads a bundle directory or gzipped tarball. All problems in the bundle are
/// reported together.
pub fn load_bundle(path: &Path) -> Result<Bundle, LoadFailure> {
    let bundle_key = path_to_key(path);
    let metadata = fs::metadata(path)
        .map_err(|error| LoadFailure::single(io_diagnostic(&bundle_key, &error)))?;

    let mut errors = Vec::new();
    let files = if metadata.is_dir() {
        read_directory(path, &bundle_key, &mut errors)
    } else {
        read_archive(path, &bundle_key).map_err(LoadFailure::single)?
    };
    let bundle = assemble(path, &bundle_key, &files, &mut errors);

    debug!(
        bundle = %bundle_key,
        archive = !metadata.is_dir(),
        revision = %bundle.manifest.revision,
        modules = bundle.modules.len(),
        errors = errors.len(),
        "loaded bundle"
    );
    if errors.is_empty() {
        Ok(bundle)
    } else {
        Err(LoadFailure::new(errors))
    }
}

pub(crate) fn is_bundle_member(relative: &str) -> bool {
    let path = Path::new(relative);
    relative == BUNDLE_MANIFEST_FILE_NAME
        || SourceKind::from_path(path) == Some(SourceKind::Policy)
        || SourceKind::is_bundle_data_file(path)
}

/// Diagnostic key for a member: the bundle path joined with the member path.
pub(crate) fn member_key(bundle_key: &str, relative: &str) -> String {
    if bundle_key == "." {
        relative.to_string()
    } else {
        format!("{bundle_key}/{relative}")
    }
}

fn read_directory(
    directory: &Path,
    bundle_key: &str,
    errors: &mut Vec<Diagnostic>,
) -> Vec<BundleFile> {
    let mut paths = Vec::new();
    collect_files(directory, &PathFilter::allow_all(), &mut paths, errors);

    let mut files = Vec::new();
    for path in paths {
        let relative = path_to_key(path.strip_prefix(directory).unwrap_or(&path));
        if !is_bundle_member(&relative) {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(text) => files.push(BundleFile { relative, text }),
            Err(error) => errors.push(io_diagnostic(&member_key(bundle_key, &relative), &error)),
        }
    }
    files
}

fn assemble(
    root: &Path,
    bundle_key: &str,
    files: &[BundleFile],
    errors: &mut Vec<Diagnostic>,
) -> Bundle {
    let manifest = files
        .iter()
        .find(|file| file.relative == BUNDLE_MANIFEST_FILE_NAME)
        .map(|file| parse_manifest(file, bundle_key, errors))
        .unwrap_or_default();

    let mut modules = Vec::new();
    for file in files {
        if file.relative == BUNDLE_MANIFEST_FILE_NAME {
            continue;
        }
        let key = member_key(bundle_key, &file.relative);
        let relative = Path::new(&file.relative);
        let kind = match SourceKind::from_path(relative) {
            Some(SourceKind::Policy) => SourceKind::Policy,
            Some(kind) if SourceKind::is_bundle_data_file(relative) => {
                check_data_root(&manifest, relative, &key, errors);
                kind
            }
            _ => continue,
        };
        match parse_document(&file.text, &key, kind) {
            Ok(Document::Policy(module)) => {
                let package_path = module.package.slash_path();
                if !manifest.permits(&package_path) {
                    errors.push(load_diagnostic(
                        bundle_key,
                        &format!(
                            "manifest roots {} do not permit 'package {}' in module file {key}",
                            manifest.describe_roots(),
                            module.package.path.join(".")
                        ),
                    ));
                }
                modules.push(BundleModule {
                    path: format!("/{}", file.relative),
                    module,
                });
            }
            Ok(Document::Data) => {}
            Err(diagnostics) => errors.extend(diagnostics),
        }
    }

    Bundle {
        root: root.to_path_buf(),
        manifest,
        modules,
    }
}

fn parse_manifest(file: &BundleFile, bundle_key: &str, errors: &mut Vec<Diagnostic>) -> Manifest {
    serde_json::from_str(&file.text).unwrap_or_else(|error| {
        errors.push(load_diagnostic(&member_key(bundle_key, &file.relative), &error));
        Manifest::default()
    })
}

/// Data below `a/b/` lands at `a/b`, which the manifest roots must allow.
fn check_data_root(manifest: &Manifest, relative: &Path, key: &str, errors: &mut Vec<Diagnostic>) {
    let Some(directory) = relative.parent() else {
        return;
    };
    let data_path = path_to_key(directory);
    if data_path == "." || manifest.permits(&data_path) {
        return;
    }
    errors.push(load_diagnostic(
        key,
        &format!(
            "manifest roots {} do not permit data at path '/{data_path}'",
            manifest.describe_roots()
        ),
    ));
}

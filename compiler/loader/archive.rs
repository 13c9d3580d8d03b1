use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path};

use compiler__diagnostics::Diagnostic;
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::bundle::{BundleFile, is_bundle_member};
use crate::documents::{io_diagnostic, load_diagnostic};

/// Reads the policy, data and manifest members of a gzipped tarball bundle,
/// sorted by member path.
pub(crate) fn read_archive(path: &Path, bundle_key: &str) -> Result<Vec<BundleFile>, Diagnostic> {
    let file = File::open(path).map_err(|error| io_diagnostic(bundle_key, &error))?;
    let malformed = |error: io::Error| {
        load_diagnostic(bundle_key, &format!("malformed bundle archive: {error}"))
    };

    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut files = Vec::new();
    for entry in archive.entries().map_err(malformed)? {
        let mut entry = entry.map_err(malformed)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let member_path = entry.path().map_err(malformed)?.into_owned();
        let Some(relative) = archive_member_name(&member_path) else {
            let member = member_path.display();
            return Err(load_diagnostic(
                bundle_key,
                &format!("illegal member path in bundle archive: {member}"),
            ));
        };
        if !is_bundle_member(&relative) {
            debug!(bundle = %bundle_key, member = %relative, "skipping archive member");
            continue;
        }
        let mut text = String::new();
        entry.read_to_string(&mut text).map_err(malformed)?;
        files.push(BundleFile { relative, text });
    }

    files.sort_by(|left, right| left.relative.cmp(&right.relative));
    Ok(files)
}

/// `/`-joined member path with `.` parts dropped. Absolute paths and `..`
/// parts have no name inside the bundle.
fn archive_member_name(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

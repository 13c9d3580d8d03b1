use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub enum SnapshotFixtureRunMode {
    Check,
    /// Rewrite expectation files in place instead of comparing.
    Update,
}

#[must_use]
pub fn snapshot_fixture_run_mode_from_environment() -> SnapshotFixtureRunMode {
    if env::var_os("UPDATE_SNAPSHOTS").is_some() {
        SnapshotFixtureRunMode::Update
    } else {
        SnapshotFixtureRunMode::Check
    }
}

/// Collects every directory below `root_directory` holding `case_marker_file_name`,
/// relative to `root_directory` and in sorted order.
pub fn collect_snapshot_fixture_case_paths(
    root_directory: &Path,
    case_marker_file_name: &str,
    case_paths: &mut Vec<PathBuf>,
) {
    collect_case_paths_below(
        root_directory,
        root_directory,
        case_marker_file_name,
        case_paths,
    );
    case_paths.sort();
}

fn collect_case_paths_below(
    directory: &Path,
    root_directory: &Path,
    case_marker_file_name: &str,
    case_paths: &mut Vec<PathBuf>,
) {
    let entries = fs::read_dir(directory)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", directory.display()));
    for entry in entries {
        let path = entry
            .unwrap_or_else(|error| panic!("failed to read {}: {error}", directory.display()))
            .path();
        if !path.is_dir() {
            continue;
        }
        if path.join(case_marker_file_name).is_file() {
            let case_path = path
                .strip_prefix(root_directory)
                .unwrap_or_else(|_| panic!("{} escapes the fixture root", path.display()));
            case_paths.push(case_path.to_path_buf());
        } else {
            collect_case_paths_below(&path, root_directory, case_marker_file_name, case_paths);
        }
    }
}

#[must_use]
pub fn read_snapshot_fixture_file(path: &Path, case_path: &Path, file_name: &str) -> String {
    let raw_contents = fs::read_to_string(path).unwrap_or_else(|error| {
        panic!(
            "failed to read {} for case {}: {}",
            file_name,
            case_path.display(),
            error
        )
    });
    if raw_contents.is_empty() {
        return String::new();
    }
    let Some(contents) = raw_contents.strip_suffix('\n') else {
        panic!(
            "{} must end with a trailing newline for case {}",
            file_name,
            case_path.display()
        );
    };
    assert!(
        !contents.is_empty(),
        "{} must be empty (no newline) or non-empty text ending with a trailing newline for case {}",
        file_name,
        case_path.display()
    );
    contents.to_string()
}

pub fn write_snapshot_fixture_file_if_changed(path: &Path, content: &str, case_path: &Path) {
    let canonical_content = if content.is_empty() {
        String::new()
    } else {
        format!("{content}\n")
    };
    let existing_contents = fs::read_to_string(path).unwrap_or_default();
    if existing_contents != canonical_content {
        fs::write(path, canonical_content)
            .unwrap_or_else(|error| panic!("failed to write {}: {error}", path.display()));
        println!("updated: {}", case_path.display());
    }
}

#[must_use]
pub fn normalize_snapshot_fixture_process_output(value: &str) -> String {
    value.strip_suffix('\n').unwrap_or(value).to_string()
}

/// Reads a case's argument file: one argument per line, blank lines skipped.
#[must_use]
pub fn read_snapshot_fixture_arguments(path: &Path, case_path: &Path) -> Vec<String> {
    let contents = fs::read_to_string(path).unwrap_or_else(|error| {
        panic!(
            "failed to read args for case {}: {error}",
            case_path.display()
        )
    });
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

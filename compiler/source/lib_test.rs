use std::cmp::Ordering;
use std::path::Path;

use compiler__source::{SourceKind, Span, compare_paths, path_to_key};

#[test]
fn keys_drop_current_directory_components() {
    assert_eq!(
        path_to_key(Path::new("./policies/./a.rego")),
        "policies/a.rego"
    );
    assert_eq!(path_to_key(Path::new(".")), ".");
    assert_eq!(path_to_key(Path::new("policies/")), "policies");
}

#[test]
fn paths_compare_by_key() {
    assert_eq!(
        compare_paths(Path::new("./a/b.rego"), Path::new("a/b.rego")),
        Ordering::Equal
    );
    assert_eq!(
        compare_paths(Path::new("a.rego"), Path::new("b.rego")),
        Ordering::Less
    );
}

#[test]
fn source_kind_follows_extension() {
    assert_eq!(
        SourceKind::from_path(Path::new("x/p.rego")),
        Some(SourceKind::Policy)
    );
    assert_eq!(
        SourceKind::from_path(Path::new("d.json")),
        Some(SourceKind::JsonData)
    );
    assert_eq!(
        SourceKind::from_path(Path::new("d.yml")),
        Some(SourceKind::YamlData)
    );
    assert_eq!(SourceKind::from_path(Path::new("README.md")), None);
    assert_eq!(SourceKind::from_path(Path::new(".manifest")), None);
}

#[test]
fn only_data_named_documents_belong_to_a_bundle() {
    assert!(SourceKind::is_bundle_data_file(Path::new("a/data.json")));
    assert!(SourceKind::is_bundle_data_file(Path::new("data.yaml")));
    assert!(!SourceKind::is_bundle_data_file(Path::new("a/other.json")));
}

#[test]
fn span_to_covers_both_ends() {
    let start = Span {
        start: 4,
        end: 6,
        line: 2,
        column: 3,
    };
    let end = Span {
        start: 10,
        end: 12,
        line: 3,
        column: 1,
    };

    assert_eq!(
        start.to(&end),
        Span {
            start: 4,
            end: 12,
            line: 2,
            column: 3,
        }
    );
}

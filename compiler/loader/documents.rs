use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__parsing::parse_module;
use compiler__source::SourceKind;
use compiler__syntax::Module;

/// Outcome of loading one source file.
pub(crate) enum Document {
    Policy(Module),
    Data,
}

pub(crate) fn load_document(
    path: &Path,
    key: &str,
    kind: SourceKind,
) -> Result<Document, Vec<Diagnostic>> {
    let text = fs::read_to_string(path).map_err(|error| vec![io_diagnostic(key, &error)])?;
    parse_document(&text, key, kind)
}

pub(crate) fn parse_document(
    text: &str,
    key: &str,
    kind: SourceKind,
) -> Result<Document, Vec<Diagnostic>> {
    match kind {
        SourceKind::Policy => parse_module(text, key).map(Document::Policy),
        SourceKind::JsonData => serde_json::from_str::<serde_json::Value>(text)
            .map(|_| Document::Data)
            .map_err(|error| vec![load_diagnostic(key, &error)]),
        SourceKind::YamlData => serde_yml::from_str::<serde_yml::Value>(text)
            .map(|_| Document::Data)
            .map_err(|error| vec![load_diagnostic(key, &error)]),
    }
}

pub(crate) fn load_diagnostic(key: &str, message: &dyn std::fmt::Display) -> Diagnostic {
    Diagnostic::new(ErrorCode::Load, format!("{key}: {message}"))
}

/// Platform-independent wording for the common filesystem failures.
pub(crate) fn io_diagnostic(key: &str, error: &io::Error) -> Diagnostic {
    match error.kind() {
        ErrorKind::NotFound => load_diagnostic(key, &"no such file or directory"),
        ErrorKind::PermissionDenied => load_diagnostic(key, &"permission denied"),
        _ => load_diagnostic(key, error),
    }
}

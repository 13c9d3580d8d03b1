mod path_order;
mod source_file;
mod span;

pub use path_order::{compare_paths, path_to_key};
pub use source_file::{BUNDLE_MANIFEST_FILE_NAME, SourceKind};
pub use span::Span;

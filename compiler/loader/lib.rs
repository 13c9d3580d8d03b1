mod archive;
mod bundle;
mod documents;
mod filtered;
mod path_filter;
mod walk;

pub use bundle::{Bundle, BundleModule, Manifest, load_bundle};
pub use filtered::{LoadResult, LoadedModule, load_filtered};
pub use path_filter::{PathFilter, PathFilterError};

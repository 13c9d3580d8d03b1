mod diagnostic;
mod error_set;

pub use diagnostic::{Diagnostic, ErrorCode, Location};
pub use error_set::{Diagnostics, LoadFailure};

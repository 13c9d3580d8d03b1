mod ast;
mod visit;

use std::collections::BTreeMap;

pub use ast::*;
pub use visit::{VariableOccurrence, collect_variables, walk_terms};

/// Parsed modules keyed by module identity. Later insertions replace earlier ones.
pub type ModuleSet = BTreeMap<String, Module>;

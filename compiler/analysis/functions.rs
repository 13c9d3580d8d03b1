use compiler__syntax::Module;

use crate::builtins::{self, Builtin};
use crate::packages::PackageIndex;

pub(crate) enum FunctionTarget {
    Builtin(&'static Builtin),
    User {
        package: Vec<String>,
        name: String,
        arity: usize,
    },
}

impl FunctionTarget {
    pub(crate) fn arity(&self) -> usize {
        match self {
            Self::Builtin(builtin) => builtin.arguments.len(),
            Self::User { arity, .. } => *arity,
        }
    }
}

/// Resolves a call path seen in `module`. Local functions win over imports, imports over builtins.
pub(crate) fn resolve_function(
    packages: &PackageIndex<'_>,
    module: &Module,
    function: &[String],
) -> Option<FunctionTarget> {
    let package = &module.package.path;
    if let [name] = function
        && let Some(arity) = packages.function_arity(package, name)
    {
        return Some(FunctionTarget::User {
            package: package.clone(),
            name: name.clone(),
            arity,
        });
    }

    let expanded = expand_import(module, function);
    if let [root, package @ .., name] = expanded.as_slice()
        && root == "data"
        && let Some(arity) = packages.function_arity(package, name)
    {
        return Some(FunctionTarget::User {
            package: package.to_vec(),
            name: name.clone(),
            arity,
        });
    }

    builtins::lookup(&function.join(".")).map(FunctionTarget::Builtin)
}

/// Rewrites a path whose first segment is an import name to the imported path.
pub(crate) fn expand_import(module: &Module, path: &[String]) -> Vec<String> {
    let Some((first, rest)) = path.split_first() else {
        return Vec::new();
    };
    match module
        .imports
        .iter()
        .find(|import| import.name() == first.as_str() && import.path.len() > 1)
    {
        Some(import) => import.path.iter().chain(rest).cloned().collect(),
        None => path.to_vec(),
    }
}

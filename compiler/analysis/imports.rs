use std::collections::BTreeSet;

use compiler__diagnostics::{Diagnostic, ErrorCode};

use crate::CompileContext;
use crate::sink::{DiagnosticSink, ErrorLimitReached};

const IMPORT_ROOTS: [&str; 2] = ["data", "input"];

pub(crate) fn check_imports(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for module in context.modules.values() {
        let mut bound_names = BTreeSet::new();
        for import in &module.imports {
            if !IMPORT_ROOTS.contains(&import.root()) {
                sink.report(Diagnostic::located(
                    ErrorCode::Compile,
                    format!(
                        "invalid import {}: path must begin with data or input",
                        import.path_string()
                    ),
                    module.file.as_str(),
                    &import.span,
                ))?;
                continue;
            }
            if !bound_names.insert(import.name()) {
                sink.report(Diagnostic::located(
                    ErrorCode::Compile,
                    format!("import {} shadows another import", import.name()),
                    module.file.as_str(),
                    &import.span,
                ))?;
            }
        }
    }
    Ok(())
}

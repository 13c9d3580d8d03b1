mod assignments;
mod builtins;
mod functions;
mod imports;
mod packages;
mod recursion;
mod rule_conflicts;
mod safety;
mod sink;
mod type_checks;

use compiler__diagnostics::Diagnostics;
use compiler__syntax::ModuleSet;
use tracing::debug;

use crate::packages::PackageIndex;
use crate::sink::{DiagnosticSink, ErrorLimitReached};

/// Error limit used when the caller does not choose one.
pub const DEFAULT_ERROR_LIMIT: i64 = 10;

/// Upper bound on collected compile errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorLimit {
    Unbounded,
    AtMost(usize),
}

impl ErrorLimit {
    /// Zero and negative values mean no bound.
    #[must_use]
    pub fn from_flag(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(0) | Err(_) => Self::Unbounded,
            Ok(limit) => Self::AtMost(limit),
        }
    }
}

pub(crate) struct CompileContext<'a> {
    pub(crate) modules: &'a ModuleSet,
    pub(crate) packages: PackageIndex<'a>,
}

type Stage = fn(&CompileContext<'_>, &mut DiagnosticSink) -> Result<(), ErrorLimitReached>;

const STAGES: &[(&str, Stage)] = &[
    ("imports", imports::check_imports),
    ("rule_conflicts", rule_conflicts::check_rule_conflicts),
    ("assignments", assignments::check_assignments),
    ("safety", safety::check_safety),
    ("type_checks", type_checks::check_types),
    ("recursion", recursion::check_recursion),
];

#[derive(Debug)]
pub struct Compiler {
    error_limit: ErrorLimit,
    errors: Diagnostics,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            error_limit: ErrorLimit::Unbounded,
            errors: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: i64) -> Self {
        self.error_limit = ErrorLimit::from_flag(limit);
        self
    }

    #[must_use]
    pub fn error_limit(&self) -> ErrorLimit {
        self.error_limit
    }

    /// Compiles every module in key order. Results replace those of any earlier call.
    pub fn compile(&mut self, modules: &ModuleSet) {
        debug!(
            modules = modules.len(),
            error_limit = ?self.error_limit,
            "compiling modules"
        );
        let context = CompileContext {
            modules,
            packages: PackageIndex::new(modules),
        };
        let mut sink = DiagnosticSink::new(self.error_limit);
        if run_stages(&context, &mut sink).is_err() {
            debug!("error limit reached, compilation stopped");
        }
        self.errors = sink.into_diagnostics();
        debug!(errors = self.errors.len(), "compilation finished");
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &Diagnostics {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Diagnostics {
        self.errors
    }
}

fn run_stages(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for (name, stage) in STAGES {
        stage(context, sink)?;
        if sink.has_errors() {
            debug!(stage = name, "stage reported errors, skipping later stages");
            return Ok(());
        }
    }
    Ok(())
}

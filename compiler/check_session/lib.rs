use std::io::{self, Write};
use std::path::Path;

use compiler__analysis::{Compiler, DEFAULT_ERROR_LIMIT};
use compiler__diagnostics::{Diagnostics, LoadFailure};
use compiler__loader::{
    BundleModule, LoadedModule, PathFilter, PathFilterError, load_bundle, load_filtered,
};
use compiler__reports::{ReportFormat, render};
use compiler__syntax::{Module, ModuleSet};
use thiserror::Error;
use tracing::debug;

/// Settings for one `check` run, built once from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckConfig {
    pub format: ReportFormat,
    /// Zero or negative means no limit.
    pub error_limit: i64,
    /// Glob patterns matched against base names. Not applied in bundle mode.
    pub ignore: Vec<String>,
    pub bundle_mode: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            error_limit: DEFAULT_ERROR_LIMIT,
            ignore: Vec::new(),
            bundle_mode: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed,
}

impl CheckStatus {
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
        }
    }
}

/// Failures that prevent a check from producing a verdict.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("specify at least one file")]
    NoPaths,
    #[error(transparent)]
    InvalidIgnorePattern(#[from] PathFilterError),
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

enum Report {
    Load(LoadFailure),
    Compile(Diagnostics),
}

enum Stage {
    Loading,
    Compiling(ModuleSet),
    Reporting(Report),
    Done(CheckStatus),
}

pub struct CheckSession<'a> {
    config: &'a CheckConfig,
    filter: PathFilter,
}

impl<'a> CheckSession<'a> {
    pub fn new(config: &'a CheckConfig) -> Result<Self, CheckError> {
        let filter = PathFilter::new(&config.ignore)?;
        Ok(Self { config, filter })
    }

    /// Loads, compiles and reports on `paths`. Only a failed check writes output, and
    /// `stdout` is flushed before the verdict is returned.
    pub fn run<P: AsRef<Path>>(
        &self,
        paths: &[P],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<CheckStatus, CheckError> {
        if paths.is_empty() {
            return Err(CheckError::NoPaths);
        }

        let mut stage = Stage::Loading;
        loop {
            stage = match stage {
                Stage::Loading => match self.load_modules(paths) {
                    Ok(modules) => Stage::Compiling(modules),
                    Err(failure) => {
                        debug!(errors = failure.diagnostics().len(), "loading failed");
                        Stage::Reporting(Report::Load(failure))
                    }
                },
                Stage::Compiling(modules) => {
                    let mut compiler = Compiler::new().with_error_limit(self.config.error_limit);
                    compiler.compile(&modules);
                    if compiler.failed() {
                        Stage::Reporting(Report::Compile(compiler.into_errors()))
                    } else {
                        Stage::Done(CheckStatus::Passed)
                    }
                }
                Stage::Reporting(report) => {
                    let format = self.config.format;
                    match &report {
                        Report::Load(failure) => render(failure, format, stdout, stderr)?,
                        Report::Compile(errors) => render(errors, format, stdout, stderr)?,
                    }
                    Stage::Done(CheckStatus::Failed)
                }
                Stage::Done(status) => {
                    stdout.flush()?;
                    debug!(?status, "check finished");
                    return Ok(status);
                }
            };
        }
    }

    fn load_modules<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ModuleSet, LoadFailure> {
        let mut modules = ModuleSet::new();
        if self.config.bundle_mode {
            for path in paths {
                let bundle = load_bundle(path.as_ref())?;
                for BundleModule { path: key, module } in bundle.modules {
                    insert_module(&mut modules, key, module);
                }
            }
        } else {
            for LoadedModule { name, module } in load_filtered(paths, &self.filter)?.modules {
                insert_module(&mut modules, name, module);
            }
        }
        debug!(modules = modules.len(), "modules loaded");
        Ok(modules)
    }
}

/// Later modules replace earlier ones with the same key.
fn insert_module(modules: &mut ModuleSet, key: String, module: Module) {
    if let Some(replaced) = modules.insert(key, module) {
        debug!(file = %replaced.file, "module replaced by a later one with the same key");
    }
}

/// Runs one check with `config` over `paths`.
pub fn check_paths<P: AsRef<Path>>(
    config: &CheckConfig,
    paths: &[P],
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<CheckStatus, CheckError> {
    CheckSession::new(config)?.run(paths, stdout, stderr)
}

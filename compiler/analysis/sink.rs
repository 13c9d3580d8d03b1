use compiler__diagnostics::{Diagnostic, Diagnostics, ErrorCode};

use crate::ErrorLimit;

/// Returned once the limit is exceeded; stages propagate it with `?`.
#[derive(Debug)]
pub(crate) struct ErrorLimitReached;

pub(crate) struct DiagnosticSink {
    limit: ErrorLimit,
    diagnostics: Diagnostics,
}

impl DiagnosticSink {
    pub(crate) fn new(limit: ErrorLimit) -> Self {
        Self {
            limit,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Records `diagnostic`, or the limit marker if the sink is already full.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) -> Result<(), ErrorLimitReached> {
        if let ErrorLimit::AtMost(limit) = self.limit
            && self.diagnostics.len() >= limit
        {
            self.diagnostics
                .push(Diagnostic::new(ErrorCode::Compile, "error limit reached"));
            return Err(ErrorLimitReached);
        }
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub(crate) fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

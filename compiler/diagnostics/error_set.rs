use std::fmt;

use serde::Serialize;

use crate::Diagnostic;

/// Ordered set of diagnostics produced by one compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_error_list(formatter, &self.0, "")
    }
}

impl std::error::Error for Diagnostics {}

/// Everything that went wrong while reading inputs, before compilation ran.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LoadFailure(Diagnostics);

impl LoadFailure {
    #[must_use]
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self(Diagnostics::from(diagnostics))
    }

    #[must_use]
    pub fn single(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.0
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_error_list(formatter, self.0.as_slice(), " during loading")
    }
}

impl std::error::Error for LoadFailure {}

fn write_error_list(
    formatter: &mut fmt::Formatter<'_>,
    diagnostics: &[Diagnostic],
    context: &str,
) -> fmt::Result {
    match diagnostics {
        [] => write!(formatter, "no error(s){context}"),
        [single] => write!(formatter, "1 error occurred{context}: {single}"),
        _ => {
            write!(formatter, "{} errors occurred{context}:", diagnostics.len())?;
            for diagnostic in diagnostics {
                write!(formatter, "\n{diagnostic}")?;
            }
            Ok(())
        }
    }
}

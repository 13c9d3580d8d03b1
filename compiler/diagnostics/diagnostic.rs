use std::fmt;

use serde::Serialize;

use compiler__source::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "load_error")]
    Load,
    #[serde(rename = "rego_parse_error")]
    Parse,
    #[serde(rename = "rego_compile_error")]
    Compile,
    #[serde(rename = "rego_type_error")]
    Type,
    #[serde(rename = "rego_unsafe_var_error")]
    UnsafeVar,
    #[serde(rename = "rego_recursion_error")]
    Recursion,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load_error",
            Self::Parse => "rego_parse_error",
            Self::Compile => "rego_compile_error",
            Self::Type => "rego_type_error",
            Self::UnsafeVar => "rego_unsafe_var_error",
            Self::Recursion => "rego_recursion_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, span: &Span) -> Self {
        Self {
            file: file.into(),
            row: span.line,
            col: span.column,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn located(
        code: ErrorCode,
        message: impl Into<String>,
        file: impl Into<String>,
        span: &Span,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            location: Some(Location::new(file, span)),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                formatter,
                "{}:{}: {}: {}",
                location.file, location.row, self.code, self.message
            ),
            None => write!(formatter, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Pretty,
    Json,
}

impl ReportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("invalid report format '{value}'")),
        }
    }
}

#[derive(Serialize)]
struct ErrorReport<'a, E: ?Sized> {
    errors: &'a E,
}

/// Writes `errors` to `stdout` in the requested format.
///
/// A JSON encoding failure is written to `stderr` instead of the report.
pub fn render<E>(
    errors: &E,
    format: ReportFormat,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> io::Result<()>
where
    E: fmt::Display + Serialize + ?Sized,
{
    match format {
        ReportFormat::Pretty => writeln!(stdout, "{errors}"),
        ReportFormat::Json => match serde_json::to_string_pretty(&ErrorReport { errors }) {
            Ok(encoded) => writeln!(stdout, "{encoded}"),
            Err(error) => writeln!(stderr, "{error}"),
        },
    }
}

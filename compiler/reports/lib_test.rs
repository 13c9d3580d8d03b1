use std::fmt;

use compiler__diagnostics::{Diagnostic, Diagnostics, ErrorCode, LoadFailure};
use compiler__reports::{ReportFormat, render};
use compiler__source::Span;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};

fn render_to_strings<E>(errors: &E, format: ReportFormat) -> (String, String)
where
    E: fmt::Display + Serialize + ?Sized,
{
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    render(errors, format, &mut stdout, &mut stderr).expect("writing to memory should succeed");
    (
        String::from_utf8(stdout).expect("stdout should be utf-8"),
        String::from_utf8(stderr).expect("stderr should be utf-8"),
    )
}

fn unsafe_var(name: &str, line: usize) -> Diagnostic {
    Diagnostic::located(
        ErrorCode::UnsafeVar,
        format!("var {name} is unsafe"),
        "policy.rego",
        &Span {
            start: 0,
            end: 1,
            line,
            column: 5,
        },
    )
}

#[test]
fn format_names_round_trip_through_from_str() {
    for format in [ReportFormat::Pretty, ReportFormat::Json] {
        assert_eq!(format.as_str().parse::<ReportFormat>(), Ok(format));
    }
    assert_eq!(ReportFormat::default(), ReportFormat::Pretty);
    assert_eq!(
        "yaml".parse::<ReportFormat>(),
        Err("invalid report format 'yaml'".to_string())
    );
}

#[test]
fn pretty_writes_display_text_to_stdout() {
    let errors = Diagnostics::from(vec![unsafe_var("x", 3), unsafe_var("y", 4)]);

    let (stdout, stderr) = render_to_strings(&errors, ReportFormat::Pretty);

    assert_eq!(
        stdout,
        "2 errors occurred:\n\
         policy.rego:3: rego_unsafe_var_error: var x is unsafe\n\
         policy.rego:4: rego_unsafe_var_error: var y is unsafe\n"
    );
    assert!(stderr.is_empty());
}

#[test]
fn json_wraps_errors_in_envelope() {
    let errors = Diagnostics::from(vec![unsafe_var("x", 3)]);

    let (stdout, stderr) = render_to_strings(&errors, ReportFormat::Json);

    assert_eq!(
        stdout,
        r#"{
  "errors": [
    {
      "code": "rego_unsafe_var_error",
      "message": "var x is unsafe",
      "location": {
        "file": "policy.rego",
        "row": 3,
        "col": 5
      }
    }
  ]
}
"#
    );
    assert!(stderr.is_empty());
}

#[test]
fn json_load_failure_omits_location() {
    let failure = LoadFailure::single(Diagnostic::new(
        ErrorCode::Load,
        "missing.rego: no such file or directory",
    ));

    let (stdout, _) = render_to_strings(&failure, ReportFormat::Json);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("output should be JSON");
    assert_eq!(
        value,
        serde_json::json!({
            "errors": [
                {
                    "code": "load_error",
                    "message": "missing.rego: no such file or directory"
                }
            ]
        })
    );
}

struct Unencodable;

impl fmt::Display for Unencodable {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("unencodable")
    }
}

impl Serialize for Unencodable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("cannot encode errors"))
    }
}

#[test]
fn json_encoding_failure_goes_to_stderr() {
    let (stdout, stderr) = render_to_strings(&Unencodable, ReportFormat::Json);

    assert!(stdout.is_empty());
    assert_eq!(stderr, "cannot encode errors\n");
}

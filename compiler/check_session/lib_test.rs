use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use compiler__check_session::{CheckConfig, CheckError, CheckSession, CheckStatus, check_paths};
use compiler__reports::ReportFormat;
use compiler__source::path_to_key;

struct CheckRun {
    status: CheckStatus,
    stdout: String,
    stderr: String,
}

fn run_check(config: &CheckConfig, paths: &[PathBuf]) -> CheckRun {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = check_paths(config, paths, &mut stdout, &mut stderr)
        .expect("check should produce a verdict");
    CheckRun {
        status,
        stdout: String::from_utf8(stdout).expect("stdout should be utf-8"),
        stderr: String::from_utf8(stderr).expect("stderr should be utf-8"),
    }
}

#[test]
fn well_formed_module_passes_silently() {
    let workspace = TestWorkspace::new(&[(
        "policy.rego",
        "package authz\n\nallow { input.admin }\n",
    )]);

    for format in [ReportFormat::Pretty, ReportFormat::Json] {
        let config = CheckConfig {
            format,
            ..CheckConfig::default()
        };
        let run = run_check(&config, &[workspace.path().join("policy.rego")]);

        assert_eq!(run.status, CheckStatus::Passed);
        assert_eq!(run.status.exit_code(), 0);
        assert!(run.stdout.is_empty());
        assert!(run.stderr.is_empty());
    }
}

#[test]
fn parse_error_is_reported_as_load_failure() {
    let workspace = TestWorkspace::new(&[(
        "policy.rego",
        "package authz\n\nallow { input.x == }\n",
    )]);

    let run = run_check(
        &CheckConfig::default(),
        &[workspace.path().join("policy.rego")],
    );

    assert_eq!(run.status, CheckStatus::Failed);
    assert_eq!(run.status.exit_code(), 1);
    assert!(
        run.stdout.contains("occurred during loading:"),
        "unexpected output: {}",
        run.stdout
    );
    assert!(
        run.stdout
            .contains(&format!("{}:3: rego_parse_error: ", workspace.key("policy.rego")))
    );
}

#[test]
fn compile_error_is_rendered_as_json() {
    let workspace = TestWorkspace::new(&[("policy.rego", "package authz\n\nallow { x }\n")]);
    let config = CheckConfig {
        format: ReportFormat::Json,
        ..CheckConfig::default()
    };

    let run = run_check(&config, &[workspace.path().join("policy.rego")]);

    assert_eq!(run.status, CheckStatus::Failed);
    let value: serde_json::Value =
        serde_json::from_str(&run.stdout).expect("output should be JSON");
    assert_eq!(
        value,
        serde_json::json!({
            "errors": [
                {
                    "code": "rego_unsafe_var_error",
                    "message": "var x is unsafe",
                    "location": {
                        "file": workspace.key("policy.rego"),
                        "row": 3,
                        "col": 9
                    }
                }
            ]
        })
    );
}

#[test]
fn ignored_files_never_report_errors() {
    let workspace = TestWorkspace::new(&[
        ("dir/good.rego", "package good\n\np = 1\n"),
        ("dir/broken_test.rego", "package\n"),
    ]);
    let config = CheckConfig {
        ignore: vec!["*_test.rego".to_string()],
        ..CheckConfig::default()
    };

    let run = run_check(&config, &[workspace.path().join("dir")]);

    assert_eq!(run.status, CheckStatus::Passed);
    assert!(run.stdout.is_empty());
}

#[test]
fn error_limit_truncates_compile_errors() {
    let workspace = TestWorkspace::new(&[(
        "policy.rego",
        "package test\n\na { x }\nb { y }\nc { z }\n",
    )]);
    let config = CheckConfig {
        error_limit: 2,
        ..CheckConfig::default()
    };

    let run = run_check(&config, &[workspace.path().join("policy.rego")]);

    let file = workspace.key("policy.rego");
    assert_eq!(
        run.stdout,
        format!(
            "3 errors occurred:\n\
             {file}:3: rego_unsafe_var_error: var x is unsafe\n\
             {file}:4: rego_unsafe_var_error: var y is unsafe\n\
             rego_compile_error: error limit reached\n"
        )
    );
}

#[test]
fn non_positive_error_limit_reports_everything() {
    let workspace = TestWorkspace::new(&[(
        "policy.rego",
        "package test\n\na { x }\nb { y }\nc { z }\n",
    )]);
    let config = CheckConfig {
        error_limit: 0,
        ..CheckConfig::default()
    };

    let run = run_check(&config, &[workspace.path().join("policy.rego")]);

    assert!(run.stdout.starts_with("3 errors occurred:\n"));
    assert!(!run.stdout.contains("error limit reached"));
}

#[test]
fn same_file_twice_is_compiled_once() {
    let workspace = TestWorkspace::new(&[("policy.rego", "package test\n\np := 1\n")]);
    let file = workspace.path().join("policy.rego");

    let run = run_check(&CheckConfig::default(), &[file.clone(), file]);

    assert_eq!(run.status, CheckStatus::Passed);
}

#[test]
fn later_bundle_replaces_module_with_same_path() {
    let workspace = TestWorkspace::new(&[
        ("broken/authz/policy.rego", "package authz\n\nallow { x }\n"),
        ("broken/authz/extra.rego", "package authz\n\ndeny = false\n"),
        ("fixed/authz/policy.rego", "package authz\n\nallow { input.admin }\n"),
    ]);
    let config = CheckConfig {
        bundle_mode: true,
        ..CheckConfig::default()
    };
    let broken = workspace.path().join("broken");
    let fixed = workspace.path().join("fixed");

    let run = run_check(&config, &[broken.clone(), fixed.clone()]);
    assert_eq!(run.status, CheckStatus::Passed);

    let run = run_check(&config, &[fixed, broken]);
    assert_eq!(run.status, CheckStatus::Failed);
    assert!(run.stdout.contains("var x is unsafe"));
}

#[test]
fn bundle_mode_does_not_apply_ignore_patterns() {
    let workspace = TestWorkspace::new(&[("bundle/broken_test.rego", "package\n")]);
    let config = CheckConfig {
        bundle_mode: true,
        ignore: vec!["*_test.rego".to_string()],
        ..CheckConfig::default()
    };

    let run = run_check(&config, &[workspace.path().join("bundle")]);

    assert_eq!(run.status, CheckStatus::Failed);
    assert!(run.stdout.contains("rego_parse_error"));
}

#[test]
fn first_failing_bundle_stops_loading() {
    let workspace = TestWorkspace::new(&[("other/policy.rego", "package\n")]);
    let config = CheckConfig {
        bundle_mode: true,
        ..CheckConfig::default()
    };

    let run = run_check(
        &config,
        &[
            workspace.path().join("missing"),
            workspace.path().join("other"),
        ],
    );

    assert_eq!(
        run.stdout,
        format!(
            "1 error occurred during loading: load_error: {}: no such file or directory\n",
            workspace.key("missing")
        )
    );
}

#[test]
fn bundle_and_filtered_modes_agree() {
    let workspace = TestWorkspace::new(&[(
        "policies/authz/policy.rego",
        "package authz\n\nallow { x }\n",
    )]);
    let root = workspace.path().join("policies");

    let filtered = run_check(&CheckConfig::default(), std::slice::from_ref(&root));
    let bundled = run_check(
        &CheckConfig {
            bundle_mode: true,
            ..CheckConfig::default()
        },
        &[root],
    );

    assert_eq!(filtered.status, CheckStatus::Failed);
    assert_eq!(filtered.status, bundled.status);
    assert_eq!(filtered.stdout, bundled.stdout);
}

#[test]
fn invalid_ignore_pattern_is_rejected_before_loading() {
    let config = CheckConfig {
        ignore: vec!["[".to_string()],
        ..CheckConfig::default()
    };

    let error = CheckSession::new(&config)
        .err()
        .expect("session should not be created");

    assert!(matches!(error, CheckError::InvalidIgnorePattern(_)));
}

#[test]
fn at_least_one_path_is_required() {
    let config = CheckConfig::default();
    let session = CheckSession::new(&config).expect("session should be created");
    let paths: &[&str] = &[];

    let error = session
        .run(paths, &mut Vec::<u8>::new(), &mut Vec::<u8>::new())
        .expect_err("empty paths should be rejected");

    assert_eq!(error.to_string(), "specify at least one file");
}

#[test]
fn failed_flush_is_an_output_error() {
    let workspace = TestWorkspace::new(&[("policy.rego", "package authz\n\nallow { x }\n")]);
    let mut stdout = UnflushableWriter::default();

    let error = check_paths(
        &CheckConfig::default(),
        &[workspace.path().join("policy.rego")],
        &mut stdout,
        &mut Vec::<u8>::new(),
    )
    .expect_err("flush failure should be reported");

    assert!(matches!(error, CheckError::Output(_)));
    assert!(error.to_string().starts_with("failed to write report: "));
    assert!(String::from_utf8_lossy(&stdout.written).contains("var x is unsafe"));
}

/// Accepts writes but fails every flush, like a closed pipe.
#[derive(Default)]
struct UnflushableWriter {
    written: Vec<u8>,
}

impl Write for UnflushableWriter {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buffer);
        Ok(buffer.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

struct TestWorkspace {
    root: PathBuf,
}

impl TestWorkspace {
    fn new(files: &[(&str, &str)]) -> Self {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
        let unique_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!("policyc_check_test_{unique_suffix}_{id}"));
        fs::create_dir_all(&root).expect("workspace root should be created");

        for (relative_file, contents) in files {
            let path = root.join(relative_file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("parent directory should be created");
            }
            fs::write(path, contents).expect("test file should be written");
        }

        Self { root }
    }

    fn path(&self) -> &Path {
        &self.root
    }

    fn key(&self, relative: &str) -> String {
        path_to_key(&self.root.join(relative))
    }
}

impl Drop for TestWorkspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

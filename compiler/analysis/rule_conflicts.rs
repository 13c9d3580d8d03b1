use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__syntax::HeadAssignment;

use crate::CompileContext;
use crate::packages::{RuleEntry, rule_path};
use crate::sink::{DiagnosticSink, ErrorLimitReached};

pub(crate) fn check_rule_conflicts(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for (package, rules_by_name) in context.packages.packages() {
        for (name, entries) in rules_by_name {
            let path = rule_path(package, name);
            check_kinds(&path, entries, sink)?;
            check_defaults(&path, entries, sink)?;
            check_redeclarations(name, entries, sink)?;
        }
    }
    Ok(())
}

fn check_kinds(
    path: &str,
    entries: &[RuleEntry<'_>],
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    let Some((first, rest)) = entries.split_first() else {
        return Ok(());
    };
    let kind = first.rule.kind();
    if rest.iter().any(|entry| entry.rule.kind() != kind) {
        sink.report(Diagnostic::located(
            ErrorCode::Compile,
            format!("conflicting rules {path} found"),
            first.module.file.as_str(),
            &first.rule.head.name_span,
        ))?;
    }
    Ok(())
}

fn check_defaults(
    path: &str,
    entries: &[RuleEntry<'_>],
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    let mut defaults = entries.iter().filter(|entry| entry.rule.is_default);
    if defaults.next().is_none() {
        return Ok(());
    }
    if let Some(duplicate) = defaults.next() {
        sink.report(Diagnostic::located(
            ErrorCode::Compile,
            format!("multiple default rules {path} found"),
            duplicate.module.file.as_str(),
            &duplicate.rule.head.name_span,
        ))?;
    }
    Ok(())
}

/// A `:=` rule must be the only non-default definition of its name.
fn check_redeclarations(
    name: &str,
    entries: &[RuleEntry<'_>],
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    let definitions: Vec<&RuleEntry<'_>> = entries
        .iter()
        .filter(|entry| !entry.rule.is_default)
        .collect();
    let Some(assigned_index) = definitions
        .iter()
        .position(|entry| entry.rule.head.assignment == HeadAssignment::Assign)
    else {
        return Ok(());
    };
    let (original, redeclaration) = if assigned_index == 0 {
        match definitions.get(1) {
            Some(second) => (definitions[0], *second),
            None => return Ok(()),
        }
    } else {
        (definitions[0], definitions[assigned_index])
    };
    sink.report(Diagnostic::located(
        ErrorCode::Compile,
        format!(
            "rule {name} redeclared at {}:{}",
            original.module.file, original.rule.head.name_span.line
        ),
        redeclaration.module.file.as_str(),
        &redeclaration.rule.head.name_span,
    ))
}

use std::collections::BTreeSet;

use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__syntax::{BinaryOperator, Literal, Module, Rule, Term, collect_variables};

use crate::CompileContext;
use crate::sink::{DiagnosticSink, ErrorLimitReached};

const RESERVED_ROOTS: [&str; 2] = ["data", "input"];

pub(crate) fn check_assignments(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for module in context.modules.values() {
        for rule in &module.rules {
            check_rule(module, rule, sink)?;
        }
    }
    Ok(())
}

fn check_rule(
    module: &Module,
    rule: &Rule,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    let Some(body) = &rule.body else {
        return Ok(());
    };

    let mut declared: BTreeSet<&str> = rule
        .head
        .arguments
        .iter()
        .flatten()
        .flat_map(collect_variables)
        .map(|occurrence| occurrence.name)
        .collect();

    for literal in &body.literals {
        match literal {
            Literal::Some { variables, .. } => {
                for variable in variables {
                    declared.insert(variable.name.as_str());
                }
            }
            Literal::Expression {
                term:
                    Term::Binary {
                        operator: BinaryOperator::Assign,
                        left,
                        ..
                    },
                ..
            } => {
                if let Some(invalid) = first_invalid_target(left) {
                    sink.report(Diagnostic::located(
                        ErrorCode::Compile,
                        format!("cannot assign to {}", invalid.kind_name()),
                        module.file.as_str(),
                        invalid.span(),
                    ))?;
                    continue;
                }
                for occurrence in collect_variables(left) {
                    if occurrence.name == "_" {
                        continue;
                    }
                    if RESERVED_ROOTS.contains(&occurrence.name) {
                        sink.report(Diagnostic::located(
                            ErrorCode::Compile,
                            format!("variables must not shadow {}", occurrence.name),
                            module.file.as_str(),
                            occurrence.span,
                        ))?;
                    } else if !declared.insert(occurrence.name) {
                        sink.report(Diagnostic::located(
                            ErrorCode::Compile,
                            format!("var {} assigned above", occurrence.name),
                            module.file.as_str(),
                            occurrence.span,
                        ))?;
                    }
                }
            }
            Literal::Expression { .. } => {}
        }
    }
    Ok(())
}

/// Assignment targets are variables or arrays and object values built from them.
fn first_invalid_target(term: &Term) -> Option<&Term> {
    match term {
        Term::Variable { .. } => None,
        Term::Array { items, .. } => items.iter().find_map(first_invalid_target),
        Term::Object { entries, .. } => entries
            .iter()
            .find_map(|(_, value)| first_invalid_target(value)),
        _ => Some(term),
    }
}

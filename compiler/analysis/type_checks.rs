use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__source::Span;
use compiler__syntax::{Module, Term, walk_terms};

use crate::CompileContext;
use crate::builtins::{self, ArgumentType};
use crate::functions::{FunctionTarget, resolve_function};
use crate::sink::{DiagnosticSink, ErrorLimitReached};

pub(crate) fn check_types(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for module in context.modules.values() {
        for rule in &module.rules {
            let mut errors = Vec::new();
            for term in rule.terms() {
                walk_terms(term, &mut |nested| {
                    check_term(context, module, nested, &mut errors);
                });
            }
            for (message, span) in errors {
                sink.report(Diagnostic::located(
                    ErrorCode::Type,
                    message,
                    module.file.as_str(),
                    span,
                ))?;
            }
        }
    }
    Ok(())
}

fn check_term<'a>(
    context: &CompileContext<'_>,
    module: &Module,
    term: &'a Term,
    errors: &mut Vec<(String, &'a Span)>,
) {
    match term {
        Term::Call {
            function,
            arguments,
            span,
        } => {
            let name = function.join(".");
            let Some(target) = resolve_function(&context.packages, module, function) else {
                errors.push((format!("undefined function {name}"), span));
                return;
            };
            let arity = target.arity();
            if arguments.len() != arity && arguments.len() != arity + 1 {
                errors.push((
                    format!(
                        "{name}: arity mismatch: expected {arity} argument(s), got {}",
                        arguments.len()
                    ),
                    span,
                ));
                return;
            }
            if let FunctionTarget::Builtin(builtin) = target {
                check_arguments(builtin.name, builtin.arguments, arguments, errors);
            }
        }
        Term::Binary {
            operator,
            left,
            right,
            ..
        } if operator.is_arithmetic() => {
            if let Some(builtin) = builtins::lookup(operator.builtin_name()) {
                let operands = [left.as_ref(), right.as_ref()];
                check_arguments(builtin.name, builtin.arguments, operands, errors);
            }
        }
        _ => {}
    }
}

fn check_arguments<'a>(
    name: &str,
    expected: &[ArgumentType],
    arguments: impl IntoIterator<Item = &'a Term>,
    errors: &mut Vec<(String, &'a Span)>,
) {
    for (position, (argument, argument_type)) in arguments.into_iter().zip(expected).enumerate() {
        if let Some(kind) = literal_kind(argument)
            && !argument_type.accepts(kind)
        {
            errors.push((
                format!(
                    "{name}: invalid argument {}: got {kind}, want {}",
                    position + 1,
                    argument_type.describe()
                ),
                argument.span(),
            ));
        }
    }
}

/// Kind name of a literal argument; `None` when the value is only known at evaluation time.
fn literal_kind(term: &Term) -> Option<&'static str> {
    match term {
        Term::Null { .. }
        | Term::Boolean { .. }
        | Term::Number { .. }
        | Term::String { .. }
        | Term::Array { .. }
        | Term::Object { .. }
        | Term::Set { .. } => Some(term.kind_name()),
        _ => None,
    }
}

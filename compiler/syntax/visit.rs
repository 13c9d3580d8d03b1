use compiler__source::Span;

use crate::{RefSegment, Term};

#[derive(Clone, Copy, Debug)]
pub struct VariableOccurrence<'a> {
    pub name: &'a str,
    pub span: &'a Span,
}

/// Visits `term` and every nested term in pre-order.
pub fn walk_terms<'a>(term: &'a Term, visitor: &mut impl FnMut(&'a Term)) {
    visitor(term);
    match term {
        Term::Null { .. }
        | Term::Boolean { .. }
        | Term::Number { .. }
        | Term::String { .. }
        | Term::Variable { .. } => {}
        Term::Ref { path, .. } => {
            for segment in path {
                if let RefSegment::Index(index) = segment {
                    walk_terms(index, visitor);
                }
            }
        }
        Term::Array { items, .. } | Term::Set { items, .. } => {
            for item in items {
                walk_terms(item, visitor);
            }
        }
        Term::Object { entries, .. } => {
            for (key, value) in entries {
                walk_terms(key, visitor);
                walk_terms(value, visitor);
            }
        }
        Term::Call { arguments, .. } => {
            for argument in arguments {
                walk_terms(argument, visitor);
            }
        }
        Term::Binary { left, right, .. } => {
            walk_terms(left, visitor);
            walk_terms(right, visitor);
        }
        Term::Negate { operand, .. } => walk_terms(operand, visitor),
    }
}

/// Variables and ref roots appearing anywhere in `term`, in source order.
#[must_use]
pub fn collect_variables(term: &Term) -> Vec<VariableOccurrence<'_>> {
    let mut occurrences = Vec::new();
    walk_terms(term, &mut |nested| match nested {
        Term::Variable { name, span } => occurrences.push(VariableOccurrence { name, span }),
        Term::Ref {
            root, root_span, ..
        } => occurrences.push(VariableOccurrence {
            name: root,
            span: root_span,
        }),
        _ => {}
    });
    occurrences
}

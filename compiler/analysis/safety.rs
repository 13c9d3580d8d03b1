use std::collections::{BTreeMap, BTreeSet};

use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__source::Span;
use compiler__syntax::{
    BinaryOperator, Import, Literal, Module, RefSegment, Rule, Term, VariableOccurrence,
    collect_variables,
};

use crate::CompileContext;
use crate::functions::resolve_function;
use crate::packages::PackageIndex;
use crate::sink::{DiagnosticSink, ErrorLimitReached};

const WILDCARD: &str = "_";

pub(crate) fn check_safety(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for module in context.modules.values() {
        let mut globals: BTreeSet<&str> = ["data", "input"].into_iter().collect();
        globals.extend(module.imports.iter().map(Import::name));
        globals.extend(context.packages.rule_names(&module.package.path));

        for rule in &module.rules {
            let checker = RuleChecker {
                packages: &context.packages,
                module,
                globals: &globals,
                locals: local_variables(rule),
                bound: BTreeSet::new(),
            };
            for (name, span) in checker.unsafe_variables(rule) {
                sink.report(Diagnostic::located(
                    ErrorCode::UnsafeVar,
                    format!("var {name} is unsafe"),
                    module.file.as_str(),
                    span,
                ))?;
            }
        }
    }
    Ok(())
}

/// Names a rule declares for itself: function arguments, `some` variables and `:=` targets.
pub(crate) fn local_variables(rule: &Rule) -> BTreeSet<&str> {
    let mut locals: BTreeSet<&str> = rule
        .head
        .arguments
        .iter()
        .flatten()
        .flat_map(collect_variables)
        .map(|occurrence| occurrence.name)
        .collect();
    for literal in rule.body.iter().flat_map(|body| &body.literals) {
        match literal {
            Literal::Some { variables, .. } => {
                locals.extend(variables.iter().map(|variable| variable.name.as_str()));
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
                locals.extend(
                    collect_variables(left)
                        .into_iter()
                        .map(|occurrence| occurrence.name),
                );
            }
            Literal::Expression { .. } => {}
        }
    }
    locals
}

/// What a literal needs bound before it can run, and what it binds once it has.
#[derive(Default)]
struct Plan<'a> {
    needs: Vec<VariableOccurrence<'a>>,
    outputs: Vec<&'a str>,
}

struct RuleChecker<'a, 'c> {
    packages: &'c PackageIndex<'a>,
    module: &'a Module,
    globals: &'c BTreeSet<&'a str>,
    locals: BTreeSet<&'a str>,
    bound: BTreeSet<&'a str>,
}

impl<'a> RuleChecker<'a, '_> {
    fn is_bound(&self, name: &str) -> bool {
        name == WILDCARD
            || self.bound.contains(name)
            || (self.globals.contains(name) && !self.locals.contains(name))
    }

    fn unbound_needs<'p>(&self, plan: &'p Plan<'a>) -> Vec<&'p VariableOccurrence<'a>> {
        plan.needs
            .iter()
            .filter(|occurrence| !self.is_bound(occurrence.name))
            .collect()
    }

    /// Unsafe variables of `rule` with their first occurrence, in source order.
    fn unsafe_variables(mut self, rule: &'a Rule) -> Vec<(&'a str, &'a Span)> {
        for argument in rule.head.arguments.iter().flatten() {
            let variables = collect_variables(argument);
            self.bound
                .extend(variables.into_iter().map(|occurrence| occurrence.name));
        }

        // Literals run in whatever order their inputs allow.
        let mut pending: Vec<Vec<Plan<'a>>> = rule
            .body
            .iter()
            .flat_map(|body| &body.literals)
            .map(|literal| self.literal_plans(literal))
            .collect();
        loop {
            let before = pending.len();
            let mut index = 0;
            while index < pending.len() {
                let ready = pending[index]
                    .iter()
                    .position(|plan| self.unbound_needs(plan).is_empty());
                if let Some(ready) = ready {
                    let plans = pending.remove(index);
                    self.bound.extend(plans[ready].outputs.iter().copied());
                } else {
                    index += 1;
                }
            }
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        let mut unsafe_by_name: BTreeMap<&'a str, &'a Span> = BTreeMap::new();
        for (index, plans) in pending.iter().enumerate() {
            // Variables another stuck literal would bind are reported there instead.
            let bound_elsewhere: BTreeSet<&str> = pending
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .flat_map(|(_, other_plans)| other_plans.iter())
                .flat_map(|plan| plan.outputs.iter().copied())
                .collect();
            for occurrence in self.cheapest_unbound_needs(plans) {
                if !bound_elsewhere.contains(occurrence.name) {
                    record_first(&mut unsafe_by_name, occurrence.name, occurrence.span);
                }
            }
        }

        let stuck_outputs: BTreeSet<&str> = pending
            .iter()
            .flatten()
            .flat_map(|plan| plan.outputs.iter().copied())
            .collect();
        for term in rule.head.key.iter().chain(rule.head.value.iter()) {
            for occurrence in collect_variables(term) {
                if !self.is_bound(occurrence.name) && !stuck_outputs.contains(occurrence.name) {
                    record_first(&mut unsafe_by_name, occurrence.name, occurrence.span);
                }
            }
        }

        let mut unsafe_variables: Vec<(&'a str, &'a Span)> = unsafe_by_name.into_iter().collect();
        unsafe_variables.sort_by_key(|(_, span)| span.start);
        unsafe_variables
    }

    /// Unbound needs of the plans closest to running; ties are merged.
    fn cheapest_unbound_needs<'p>(&self, plans: &'p [Plan<'a>]) -> Vec<&'p VariableOccurrence<'a>> {
        let unbound: Vec<Vec<&VariableOccurrence<'a>>> =
            plans.iter().map(|plan| self.unbound_needs(plan)).collect();
        let Some(fewest) = unbound.iter().map(Vec::len).min() else {
            return Vec::new();
        };
        unbound
            .into_iter()
            .filter(|needs| needs.len() == fewest)
            .flatten()
            .collect()
    }

    fn literal_plans(&self, literal: &'a Literal) -> Vec<Plan<'a>> {
        let (negated, term) = match literal {
            Literal::Some { .. } => return vec![Plan::default()],
            Literal::Expression { negated, term, .. } => (*negated, term),
        };
        if negated {
            return vec![Plan {
                needs: collect_variables(term),
                outputs: Vec::new(),
            }];
        }
        match term {
            Term::Binary {
                operator: BinaryOperator::Assign,
                left,
                right,
                ..
            } => vec![self.unification_plan(left, right)],
            Term::Binary {
                operator: BinaryOperator::Unify,
                left,
                right,
                ..
            } => vec![
                self.unification_plan(left, right),
                self.unification_plan(right, left),
            ],
            _ => {
                let mut plan = Plan::default();
                self.value_plan(term, &mut plan);
                vec![plan]
            }
        }
    }

    /// Evaluates `value`, then binds the variables of `pattern` against it.
    fn unification_plan(&self, pattern: &'a Term, value: &'a Term) -> Plan<'a> {
        let mut plan = Plan::default();
        self.value_plan(value, &mut plan);
        self.pattern_plan(pattern, &mut plan);
        plan
    }

    fn pattern_plan(&self, term: &'a Term, plan: &mut Plan<'a>) {
        match term {
            Term::Variable { name, .. } => plan.outputs.push(name),
            Term::Array { items, .. } | Term::Set { items, .. } => {
                for item in items {
                    self.pattern_plan(item, plan);
                }
            }
            Term::Object { entries, .. } => {
                for (key, value) in entries {
                    self.value_plan(key, plan);
                    self.pattern_plan(value, plan);
                }
            }
            _ => self.value_plan(term, plan),
        }
    }

    fn value_plan(&self, term: &'a Term, plan: &mut Plan<'a>) {
        match term {
            Term::Null { .. }
            | Term::Boolean { .. }
            | Term::Number { .. }
            | Term::String { .. } => {}
            Term::Variable { name, span } => plan.needs.push(VariableOccurrence { name, span }),
            Term::Ref {
                root,
                root_span,
                path,
                ..
            } => {
                plan.needs.push(VariableOccurrence {
                    name: root,
                    span: root_span,
                });
                for segment in path {
                    match segment {
                        RefSegment::Field { .. } => {}
                        // Iterating a collection binds its index variable.
                        RefSegment::Index(Term::Variable { name, .. }) => plan.outputs.push(name),
                        RefSegment::Index(index) => self.value_plan(index, plan),
                    }
                }
            }
            Term::Array { items, .. } | Term::Set { items, .. } => {
                for item in items {
                    self.value_plan(item, plan);
                }
            }
            Term::Object { entries, .. } => {
                for (key, value) in entries {
                    self.value_plan(key, plan);
                    self.value_plan(value, plan);
                }
            }
            Term::Call {
                function,
                arguments,
                ..
            } => {
                let arity = resolve_function(self.packages, self.module, function)
                    .map(|target| target.arity());
                for (position, argument) in arguments.iter().enumerate() {
                    let is_output = arity.is_some_and(|arity| {
                        arguments.len() == arity + 1 && position == arity
                    });
                    match argument {
                        Term::Variable { name, .. } if is_output => plan.outputs.push(name),
                        _ => self.value_plan(argument, plan),
                    }
                }
            }
            Term::Binary { left, right, .. } => {
                self.value_plan(left, plan);
                self.value_plan(right, plan);
            }
            Term::Negate { operand, .. } => self.value_plan(operand, plan),
        }
    }
}

fn record_first<'a>(
    unsafe_by_name: &mut BTreeMap<&'a str, &'a Span>,
    name: &'a str,
    span: &'a Span,
) {
    let entry = unsafe_by_name.entry(name).or_insert(span);
    if span.start < entry.start {
        *entry = span;
    }
}

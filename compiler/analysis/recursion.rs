use std::collections::{BTreeMap, BTreeSet};

use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__syntax::{RefSegment, Rule, Term, walk_terms};

use crate::CompileContext;
use crate::functions::{FunctionTarget, expand_import, resolve_function};
use crate::packages::RuleEntry;
use crate::safety::local_variables;
use crate::sink::{DiagnosticSink, ErrorLimitReached};

type DependenciesByRule<'a> = BTreeMap<&'a str, BTreeSet<&'a str>>;

pub(crate) fn check_recursion(
    context: &CompileContext<'_>,
    sink: &mut DiagnosticSink,
) -> Result<(), ErrorLimitReached> {
    for (package, rules_by_name) in context.packages.packages() {
        let mut dependencies_by_rule: DependenciesByRule<'_> = BTreeMap::new();
        for (name, entries) in rules_by_name {
            let dependencies = dependencies_by_rule.entry(*name).or_default();
            for entry in entries {
                for dependency in rule_dependencies(context, package, entry) {
                    if let Some((known, _)) = rules_by_name.get_key_value(dependency.as_str()) {
                        dependencies.insert(*known);
                    }
                }
            }
        }

        let mut reported: BTreeSet<&str> = BTreeSet::new();
        for (name, entries) in rules_by_name {
            if reported.contains(name) {
                continue;
            }
            let Some(cycle) = cycle_through(name, &dependencies_by_rule) else {
                continue;
            };
            reported.extend(cycle.iter().copied());
            let Some(first) = entries.first() else {
                continue;
            };
            sink.report(Diagnostic::located(
                ErrorCode::Recursion,
                format!("rule {name} is recursive: {}", cycle.join(" -> ")),
                first.module.file.as_str(),
                &first.rule.head.name_span,
            ))?;
        }
    }
    Ok(())
}

/// Names of same-package rules that `entry` refers to.
fn rule_dependencies(
    context: &CompileContext<'_>,
    package: &[String],
    entry: &RuleEntry<'_>,
) -> BTreeSet<String> {
    let RuleEntry { module, rule } = *entry;
    let locals = local_variables(rule);
    let mut dependencies = BTreeSet::new();
    for term in rule_terms(rule) {
        walk_terms(term, &mut |nested| match nested {
            Term::Variable { name, .. } if !locals.contains(name.as_str()) => {
                dependencies.insert(name.clone());
            }
            Term::Ref { root, path, .. } if !locals.contains(root.as_str()) => {
                let mut segments = vec![root.clone()];
                segments.extend(path.iter().map_while(|segment| match segment {
                    RefSegment::Field { name, .. } => Some(name.clone()),
                    RefSegment::Index(Term::String { value, .. }) => Some(value.clone()),
                    RefSegment::Index(_) => None,
                }));
                let segments = expand_import(module, &segments);
                match segments.split_first() {
                    Some((root, rest)) if root == "data" => {
                        if let Some(name) = rest
                            .strip_prefix(package)
                            .and_then(|remaining| remaining.first())
                        {
                            dependencies.insert(name.clone());
                        }
                    }
                    Some((root, _)) => {
                        dependencies.insert(root.clone());
                    }
                    None => {}
                }
            }
            Term::Call { function, .. } => {
                if let Some(FunctionTarget::User {
                    package: target_package,
                    name,
                    ..
                }) = resolve_function(&context.packages, module, function)
                    && target_package == package
                {
                    dependencies.insert(name);
                }
            }
            _ => {}
        });
    }
    dependencies
}

/// Body terms, then head key and value. Function arguments only bind.
fn rule_terms(rule: &Rule) -> impl Iterator<Item = &Term> {
    rule.body
        .iter()
        .flat_map(|body| body.literals.iter())
        .filter_map(|literal| literal.term())
        .chain(rule.head.key.iter())
        .chain(rule.head.value.iter())
}

/// A path `start -> ... -> start`, if `start` lies on a cycle.
fn cycle_through<'a>(
    start: &'a str,
    dependencies_by_rule: &DependenciesByRule<'a>,
) -> Option<Vec<&'a str>> {
    fn depth_first_search<'a>(
        node: &'a str,
        start: &'a str,
        dependencies_by_rule: &DependenciesByRule<'a>,
        visited: &mut BTreeSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> bool {
        stack.push(node);
        if let Some(neighbors) = dependencies_by_rule.get(node) {
            for &neighbor in neighbors {
                if neighbor == start {
                    stack.push(neighbor);
                    return true;
                }
                if visited.insert(neighbor)
                    && depth_first_search(neighbor, start, dependencies_by_rule, visited, stack)
                {
                    return true;
                }
            }
        }
        stack.pop();
        false
    }

    let mut visited = BTreeSet::new();
    let mut stack = Vec::new();
    depth_first_search(start, start, dependencies_by_rule, &mut visited, &mut stack)
        .then_some(stack)
}

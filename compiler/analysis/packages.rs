use std::collections::BTreeMap;

use compiler__syntax::{Module, ModuleSet, Rule, RuleKind};

#[derive(Clone, Copy)]
pub(crate) struct RuleEntry<'a> {
    pub(crate) module: &'a Module,
    pub(crate) rule: &'a Rule,
}

pub(crate) type RulesByName<'a> = BTreeMap<&'a str, Vec<RuleEntry<'a>>>;

/// Rules grouped by package path, then by name, in module key order.
pub(crate) struct PackageIndex<'a> {
    rules_by_package: BTreeMap<&'a [String], RulesByName<'a>>,
}

impl<'a> PackageIndex<'a> {
    pub(crate) fn new(modules: &'a ModuleSet) -> Self {
        let mut rules_by_package: BTreeMap<&'a [String], RulesByName<'a>> = BTreeMap::new();
        for module in modules.values() {
            let rules_by_name = rules_by_package
                .entry(module.package.path.as_slice())
                .or_default();
            for rule in &module.rules {
                rules_by_name
                    .entry(rule.head.name.as_str())
                    .or_default()
                    .push(RuleEntry { module, rule });
            }
        }
        Self { rules_by_package }
    }

    pub(crate) fn packages(&self) -> impl Iterator<Item = (&'a [String], &RulesByName<'a>)> {
        self.rules_by_package
            .iter()
            .map(|(path, rules_by_name)| (*path, rules_by_name))
    }

    pub(crate) fn rule_names(&self, package: &[String]) -> impl Iterator<Item = &'a str> + '_ {
        self.rules_by_package
            .get(package)
            .into_iter()
            .flat_map(|rules_by_name| rules_by_name.keys().copied())
    }

    /// Arity of the function `name` in `package`, if one is defined there.
    pub(crate) fn function_arity(&self, package: &[String], name: &str) -> Option<usize> {
        self.rules_by_package
            .get(package)?
            .get(name)?
            .iter()
            .find_map(|entry| match entry.rule.kind() {
                RuleKind::Function { arity } => Some(arity),
                _ => None,
            })
    }
}

/// `data.a.b` plus `.name`, the form used in compile messages.
pub(crate) fn rule_path(package: &[String], name: &str) -> String {
    let mut path = String::from("data");
    for segment in package {
        path.push('.');
        path.push_str(segment);
    }
    path.push('.');
    path.push_str(name);
    path
}

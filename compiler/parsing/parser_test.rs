use compiler__parsing::parse_module;
use compiler__syntax::{BinaryOperator, HeadAssignment, Literal, Module, RuleKind, Term};

fn parse(source: &str) -> Module {
    match parse_module(source, "test.rego") {
        Ok(module) => module,
        Err(diagnostics) => panic!("unexpected parse errors: {diagnostics:?}"),
    }
}

fn errors(source: &str) -> Vec<String> {
    parse_module(source, "test.rego")
        .expect_err("expected parse errors")
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn parses_package_imports_and_rule_kinds() {
    let module = parse(
        "package authz.http\n\
         \n\
         import data.lib.roles\n\
         import input.request as req\n\
         \n\
         default allow = false\n\
         allow { req.method == \"GET\" }\n\
         admins[name] { name := roles.admins[_] }\n\
         labels[key] = value { value := input.labels[key] }\n\
         double(x) = y { y := x * 2 }\n\
         limit := 10\n",
    );

    assert_eq!(module.package.path, vec!["authz", "http"]);
    assert_eq!(module.package.data_path(), "data.authz.http");
    assert_eq!(module.imports.len(), 2);
    assert_eq!(module.imports[0].name(), "roles");
    assert_eq!(module.imports[1].name(), "req");
    assert_eq!(module.imports[1].root(), "input");

    let kinds: Vec<(String, RuleKind)> = module
        .rules
        .iter()
        .map(|rule| (rule.head.name.clone(), rule.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("allow".to_string(), RuleKind::Complete),
            ("allow".to_string(), RuleKind::Complete),
            ("admins".to_string(), RuleKind::PartialSet),
            ("labels".to_string(), RuleKind::PartialObject),
            ("double".to_string(), RuleKind::Function { arity: 1 }),
            ("limit".to_string(), RuleKind::Complete),
        ]
    );
    assert!(module.rules[0].is_default);
    assert_eq!(module.rules[5].head.assignment, HeadAssignment::Assign);
    assert_eq!(module.rules[1].head.name_span.line, 7);
}

#[test]
fn body_literals_split_on_newlines_and_semicolons() {
    let module = parse(
        "package a\n\
         p {\n\
         \x20 x := 1; y := 2\n\
         \n\
         \x20 not x == y\n\
         \x20 some i\n\
         }\n",
    );
    let body = module.rules[0].body.as_ref().unwrap();
    assert_eq!(body.literals.len(), 4);
    assert!(matches!(body.literals[2], Literal::Expression { negated: true, .. }));
    assert!(matches!(&body.literals[3], Literal::Some { variables, .. } if variables[0].name == "i"));
}

#[test]
fn newlines_inside_brackets_are_insignificant() {
    let module = parse(
        "package a\n\
         names := [\n\
         \x20 \"alice\",\n\
         \x20 \"bob\",\n\
         ]\n\
         p { count(\n\
         \x20 names\n\
         ) > 1 }\n",
    );
    assert_eq!(module.rules.len(), 2);
    let Some(Term::Array { items, .. }) = &module.rules[0].head.value else {
        panic!("expected array value");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn arithmetic_binds_tighter_than_assignment() {
    let module = parse("package a\np { x := 1 + 2 * 3 }\n");
    let body = module.rules[0].body.as_ref().unwrap();
    let Some(Term::Binary {
        operator, right, ..
    }) = body.literals[0].term()
    else {
        panic!("expected binary term");
    };
    assert_eq!(*operator, BinaryOperator::Assign);
    let Term::Binary {
        operator, right, ..
    } = right.as_ref()
    else {
        panic!("expected addition");
    };
    assert_eq!(*operator, BinaryOperator::Add);
    assert!(matches!(
        right.as_ref(),
        Term::Binary {
            operator: BinaryOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn braces_distinguish_objects_sets_and_empty_object() {
    let module = parse(
        "package a\n\
         o := {\"a\": 1, \"b\": 2}\n\
         s := {1, 2, 3}\n\
         e := {}\n\
         n := set()\n",
    );
    let values: Vec<&str> = module
        .rules
        .iter()
        .map(|rule| rule.head.value.as_ref().unwrap().kind_name())
        .collect();
    assert_eq!(values, vec!["object", "set", "object", "set"]);
}

#[test]
fn refs_and_calls_keep_their_paths() {
    let module = parse("package a\np { input.users[i].name == data.lib.name(i) }\n");
    let literal = &module.rules[0].body.as_ref().unwrap().literals[0];
    let Some(Term::Binary { left, right, .. }) = literal.term() else {
        panic!("expected comparison");
    };
    let Term::Ref { root, path, .. } = left.as_ref() else {
        panic!("expected ref");
    };
    assert_eq!(root, "input");
    assert_eq!(path.len(), 3);
    let Term::Call { function, .. } = right.as_ref() else {
        panic!("expected call");
    };
    assert_eq!(function, &vec!["data", "lib", "name"]);
}

#[test]
fn raw_strings_and_negative_numbers_are_literals() {
    let module = parse("package a\npattern := `^\\d+$`\nfloor := -1.5e3\n");
    assert!(matches!(
        &module.rules[0].head.value,
        Some(Term::String { value, .. }) if value == "^\\d+$"
    ));
    assert!(matches!(
        &module.rules[1].head.value,
        Some(Term::Number { text, .. }) if text == "-1.5e3"
    ));
}

#[test]
fn comments_are_ignored() {
    let module = parse("# header\npackage a # trailing\n\n# rule\np { true } # done\n");
    assert_eq!(module.rules.len(), 1);
}

#[test]
fn missing_package_is_reported_at_first_token() {
    assert_eq!(
        errors("p { true }\n"),
        vec!["test.rego:1: rego_parse_error: unexpected identifier 'p': expected package declaration"]
    );
}

#[test]
fn unterminated_string_is_reported_once() {
    assert_eq!(
        errors("package a\n\np { x := \"abc }\n"),
        vec!["test.rego:3: rego_parse_error: unterminated string literal"]
    );
}

#[test]
fn unexpected_character_is_reported() {
    assert_eq!(
        errors("package a\np { x := 1 ? 2 }\n"),
        vec!["test.rego:2: rego_parse_error: unexpected character '?'"]
    );
}

#[test]
fn recovery_continues_at_next_rule() {
    assert_eq!(
        errors("package a\n\np { x := }\nq { y := 1 }\nr := [1, 2"),
        vec![
            "test.rego:3: rego_parse_error: unexpected '}': expected term",
            "test.rego:5: rego_parse_error: unexpected end of file: expected ']'",
        ]
    );
}

#[test]
fn default_rule_requires_value() {
    assert_eq!(
        errors("package a\ndefault allow\n"),
        vec!["test.rego:2: rego_parse_error: default rule must have a value"]
    );
}

#[test]
fn default_rule_rejects_body() {
    assert_eq!(
        errors("package a\ndefault allow = false { true }\n"),
        vec!["test.rego:2: rego_parse_error: default rules must not have a body"]
    );
}

#[test]
fn empty_body_is_rejected() {
    assert_eq!(
        errors("package a\np {}\n"),
        vec!["test.rego:2: rego_parse_error: found empty body"]
    );
}

#[test]
fn partial_rules_cannot_use_assign() {
    assert_eq!(
        errors("package a\np[x] := 1 { x := 2 }\n"),
        vec!["test.rego:2: rego_parse_error: partial rules must use = operator (not := operator)"]
    );
}

#[test]
fn body_on_next_line_leaves_bare_rule() {
    assert_eq!(
        errors("package a\np\n{ true }\n"),
        vec!["test.rego:2: rego_parse_error: rule p must have a value or a body"]
    );
}

#[test]
fn missing_literal_separator_is_reported() {
    assert_eq!(
        errors("package a\np { x := 1 y := 2 }\n"),
        vec!["test.rego:2: rego_parse_error: unexpected identifier 'y': expected ';', newline or '}'"]
    );
}

fn nested_arrays(depth: usize) -> String {
    format!(
        "package a\np {{ x := {}1{}; x != 0 }}\n",
        "[".repeat(depth),
        "]".repeat(depth)
    )
}

/// Runs `check` on a thread whose stack fits a full-depth parse in debug builds.
fn on_large_stack<T: Send + 'static>(check: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(check)
        .expect("parser thread should start")
        .join()
        .expect("parser thread should not panic")
}

#[test]
fn nesting_within_the_limit_parses() {
    on_large_stack(|| {
        let module = parse(&nested_arrays(500));
        assert_eq!(module.rules.len(), 1);
    });
}

#[test]
fn nesting_beyond_the_limit_is_a_parse_error() {
    let messages = on_large_stack(|| errors(&nested_arrays(3000)));

    assert_eq!(
        messages,
        vec!["test.rego:2: rego_parse_error: max nesting depth exceeded"]
    );
}

#[test]
fn long_operator_chains_count_toward_the_limit() {
    let source = format!("package a\np {{ x := 1{} }}\nq := 1\n", " + 1".repeat(3000));

    let messages = on_large_stack(move || errors(&source));

    assert_eq!(
        messages,
        vec!["test.rego:2: rego_parse_error: max nesting depth exceeded"]
    );
}

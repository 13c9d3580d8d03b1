use std::fmt;

use compiler__source::Span;

#[derive(Clone, Debug)]
pub struct Module {
    /// File the module was parsed from; used for diagnostic locations.
    pub file: String,
    pub package: Package,
    pub imports: Vec<Import>,
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug)]
pub struct Package {
    pub path: Vec<String>,
    pub span: Span,
}

impl Package {
    /// Absolute document path of the package, e.g. `data.authz.http`.
    #[must_use]
    pub fn data_path(&self) -> String {
        let mut path = String::from("data");
        for segment in &self.path {
            path.push('.');
            path.push_str(segment);
        }
        path
    }

    /// Package path as used by bundle manifest roots, e.g. `authz/http`.
    #[must_use]
    pub fn slash_path(&self) -> String {
        self.path.join("/")
    }
}

#[derive(Clone, Debug)]
pub struct Import {
    pub path: Vec<String>,
    pub alias: Option<String>,
    pub span: Span,
}

impl Import {
    #[must_use]
    pub fn root(&self) -> &str {
        self.path.first().map_or("", String::as_str)
    }

    /// Name the import binds inside the module.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.last().map_or("", String::as_str),
        }
    }

    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub is_default: bool,
    pub head: RuleHead,
    pub body: Option<Body>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadAssignment {
    None,
    Unify,
    Assign,
}

#[derive(Clone, Debug)]
pub struct RuleHead {
    pub name: String,
    pub name_span: Span,
    pub arguments: Option<Vec<Term>>,
    pub key: Option<Term>,
    pub value: Option<Term>,
    pub assignment: HeadAssignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    Complete,
    PartialSet,
    PartialObject,
    Function { arity: usize },
}

impl fmt::Display for RuleKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => formatter.write_str("complete"),
            Self::PartialSet => formatter.write_str("partial set"),
            Self::PartialObject => formatter.write_str("partial object"),
            Self::Function { arity } => write!(formatter, "function/{arity}"),
        }
    }
}

impl Rule {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        if let Some(arguments) = &self.head.arguments {
            return RuleKind::Function {
                arity: arguments.len(),
            };
        }
        match (&self.head.key, &self.head.value) {
            (Some(_), Some(_)) => RuleKind::PartialObject,
            (Some(_), None) => RuleKind::PartialSet,
            (None, _) => RuleKind::Complete,
        }
    }

    /// Head terms followed by body literal terms, in source order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        let head = &self.head;
        head.arguments
            .iter()
            .flatten()
            .chain(head.key.iter())
            .chain(head.value.iter())
            .chain(
                self.body
                    .iter()
                    .flat_map(|body| body.literals.iter())
                    .filter_map(Literal::term),
            )
    }
}

#[derive(Clone, Debug)]
pub struct Body {
    pub literals: Vec<Literal>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SomeVariable {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Literal {
    Expression {
        negated: bool,
        term: Term,
        span: Span,
    },
    Some {
        variables: Vec<SomeVariable>,
        span: Span,
    },
}

impl Literal {
    #[must_use]
    pub fn term(&self) -> Option<&Term> {
        match self {
            Self::Expression { term, .. } => Some(term),
            Self::Some { .. } => None,
        }
    }

    #[must_use]
    pub fn span(&self) -> &Span {
        match self {
            Self::Expression { span, .. } | Self::Some { span, .. } => span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    // keep-sorted start
    Add,
    Assign,
    Divide,
    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Multiply,
    NotEqual,
    Subtract,
    Unify,
    // keep-sorted end
}

impl BinaryOperator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            // keep-sorted start
            Self::Add => "+",
            Self::Assign => ":=",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Multiply => "*",
            Self::NotEqual => "!=",
            Self::Subtract => "-",
            Self::Unify => "=",
            // keep-sorted end
        }
    }

    /// Name of the builtin the operator desugars to.
    #[must_use]
    pub fn builtin_name(self) -> &'static str {
        match self {
            // keep-sorted start
            Self::Add => "plus",
            Self::Assign => "assign",
            Self::Divide => "div",
            Self::Equal => "equal",
            Self::Greater => "gt",
            Self::GreaterEqual => "gte",
            Self::Less => "lt",
            Self::LessEqual => "lte",
            Self::Multiply => "mul",
            Self::NotEqual => "neq",
            Self::Subtract => "minus",
            Self::Unify => "eq",
            // keep-sorted end
        }
    }

    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide
        )
    }
}

#[derive(Clone, Debug)]
pub enum RefSegment {
    Field { name: String, span: Span },
    Index(Term),
}

#[derive(Clone, Debug)]
pub enum Term {
    Null {
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Number {
        text: String,
        span: Span,
    },
    String {
        value: String,
        span: Span,
    },
    Variable {
        name: String,
        span: Span,
    },
    Ref {
        root: String,
        root_span: Span,
        path: Vec<RefSegment>,
        span: Span,
    },
    Array {
        items: Vec<Term>,
        span: Span,
    },
    Object {
        entries: Vec<(Term, Term)>,
        span: Span,
    },
    Set {
        items: Vec<Term>,
        span: Span,
    },
    Call {
        function: Vec<String>,
        arguments: Vec<Term>,
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Term>,
        right: Box<Term>,
        span: Span,
    },
    Negate {
        operand: Box<Term>,
        span: Span,
    },
}

impl Term {
    #[must_use]
    pub fn span(&self) -> &Span {
        match self {
            Self::Null { span }
            | Self::Boolean { span, .. }
            | Self::Number { span, .. }
            | Self::String { span, .. }
            | Self::Variable { span, .. }
            | Self::Ref { span, .. }
            | Self::Array { span, .. }
            | Self::Object { span, .. }
            | Self::Set { span, .. }
            | Self::Call { span, .. }
            | Self::Binary { span, .. }
            | Self::Negate { span, .. } => span,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null { .. } => "null",
            Self::Boolean { .. } => "boolean",
            Self::Number { .. } => "number",
            Self::String { .. } => "string",
            Self::Variable { .. } => "var",
            Self::Ref { .. } => "ref",
            Self::Array { .. } => "array",
            Self::Object { .. } => "object",
            Self::Set { .. } => "set",
            Self::Call { .. } => "call",
            Self::Binary { .. } | Self::Negate { .. } => "expression",
        }
    }

    /// Dotted text of a ref whose segments are all fields, e.g. `data.lib.f`.
    #[must_use]
    pub fn dotted_path(&self) -> Option<Vec<String>> {
        match self {
            Self::Variable { name, .. } => Some(vec![name.clone()]),
            Self::Ref { root, path, .. } => {
                let mut segments = vec![root.clone()];
                for segment in path {
                    match segment {
                        RefSegment::Field { name, .. } => segments.push(name.clone()),
                        RefSegment::Index(Term::String { value, .. }) => {
                            segments.push(value.clone());
                        }
                        RefSegment::Index(_) => return None,
                    }
                }
                Some(segments)
            }
            _ => None,
        }
    }
}

/// Argument types the checker can verify against literal arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ArgumentType {
    // keep-sorted start
    Any,
    Array,
    ArrayOrSet,
    Collection,
    Number,
    NumberOrSet,
    Object,
    Set,
    Sized,
    String,
    // keep-sorted end
}

impl ArgumentType {
    /// Whether a literal of `kind` (see `Term::kind_name`) may be passed.
    pub(crate) fn accepts(self, kind: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Array => kind == "array",
            Self::ArrayOrSet => matches!(kind, "array" | "set"),
            Self::Collection => matches!(kind, "array" | "object" | "set"),
            Self::Number => kind == "number",
            Self::NumberOrSet => matches!(kind, "number" | "set"),
            Self::Object => kind == "object",
            Self::Set => kind == "set",
            Self::Sized => matches!(kind, "array" | "object" | "set" | "string"),
            Self::String => kind == "string",
        }
    }

    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Array => "array",
            Self::ArrayOrSet => "array or set",
            Self::Collection => "array, object or set",
            Self::Number => "number",
            Self::NumberOrSet => "number or set",
            Self::Object => "object",
            Self::Set => "set",
            Self::Sized => "array, object, set or string",
            Self::String => "string",
        }
    }
}

pub(crate) struct Builtin {
    pub(crate) name: &'static str,
    pub(crate) arguments: &'static [ArgumentType],
}

use ArgumentType::{
    Any, Array, ArrayOrSet, Collection, Number, NumberOrSet, Object, Set, Sized, String,
};

const BUILTINS: &[Builtin] = &[
    // keep-sorted start
    builtin("abs", &[Number]),
    builtin("array.concat", &[Array, Array]),
    builtin("array.slice", &[Array, Number, Number]),
    builtin("base64.decode", &[String]),
    builtin("base64.encode", &[String]),
    builtin("ceil", &[Number]),
    builtin("concat", &[String, ArrayOrSet]),
    builtin("contains", &[String, String]),
    builtin("count", &[Sized]),
    builtin("div", &[Number, Number]),
    builtin("endswith", &[String, String]),
    builtin("floor", &[Number]),
    builtin("format_int", &[Number, Number]),
    builtin("indexof", &[String, String]),
    builtin("intersection", &[Set]),
    builtin("is_array", &[Any]),
    builtin("is_boolean", &[Any]),
    builtin("is_null", &[Any]),
    builtin("is_number", &[Any]),
    builtin("is_object", &[Any]),
    builtin("is_set", &[Any]),
    builtin("is_string", &[Any]),
    builtin("json.marshal", &[Any]),
    builtin("json.unmarshal", &[String]),
    builtin("lower", &[String]),
    builtin("max", &[ArrayOrSet]),
    builtin("min", &[ArrayOrSet]),
    builtin("minus", &[NumberOrSet, NumberOrSet]),
    builtin("mul", &[Number, Number]),
    builtin("net.cidr_contains", &[String, String]),
    builtin("object.get", &[Object, Any, Any]),
    builtin("object.keys", &[Object]),
    builtin("plus", &[Number, Number]),
    builtin("product", &[ArrayOrSet]),
    builtin("regex.match", &[String, String]),
    builtin("replace", &[String, String, String]),
    builtin("round", &[Number]),
    builtin("sort", &[ArrayOrSet]),
    builtin("split", &[String, String]),
    builtin("sprintf", &[String, Array]),
    builtin("startswith", &[String, String]),
    builtin("substring", &[String, Number, Number]),
    builtin("sum", &[ArrayOrSet]),
    builtin("time.now_ns", &[]),
    builtin("to_number", &[Any]),
    builtin("trace", &[String]),
    builtin("trim", &[String, String]),
    builtin("trim_space", &[String]),
    builtin("type_name", &[Any]),
    builtin("union", &[Set]),
    builtin("upper", &[String]),
    builtin("walk", &[Collection]),
    builtin("yaml.marshal", &[Any]),
    builtin("yaml.unmarshal", &[String]),
    // keep-sorted end
];

const fn builtin(name: &'static str, arguments: &'static [ArgumentType]) -> Builtin {
    Builtin { name, arguments }
}

pub(crate) fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS
        .binary_search_by(|builtin| builtin.name.cmp(name))
        .ok()
        .map(|index| &BUILTINS[index])
}

//! Host-type inference (`spec.md §4.A`): maps a host-language type
//! expression to the `PortKind` universe. STEP is never produced here — it
//! is assigned by structural position in the doc-comment parser.

use once_cell::sync::Lazy;
use regex::Regex;

use flow_weaver_ast::PortKind;

static ARRAY_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:Array<.+>|.+\[\]\s*)$").unwrap());
static FUNCTION_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(.*\)\s*=>").unwrap());

/// Infers a `PortKind` from a host-language type expression, in the order
/// given by `spec.md §4.A`.
pub fn infer_port_kind(type_text: &str) -> PortKind {
    let t = type_text.trim();
    match t {
        "boolean" => return PortKind::Boolean,
        "number" => return PortKind::Number,
        "string" => return PortKind::String,
        "any" | "unknown" | "never" => return PortKind::Any,
        _ => {}
    }
    if ARRAY_TYPE.is_match(t) {
        return PortKind::Array;
    }
    if FUNCTION_TYPE.is_match(t) || t.starts_with("Function") {
        return PortKind::Function;
    }
    if t.starts_with('{') || t.chars().next().is_some_and(|c| c.is_uppercase()) {
        return PortKind::Object;
    }
    PortKind::Any
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        assert_eq!(infer_port_kind("boolean"), PortKind::Boolean);
        assert_eq!(infer_port_kind("number"), PortKind::Number);
        assert_eq!(infer_port_kind("string"), PortKind::String);
    }

    #[test]
    fn arrays_both_forms() {
        assert_eq!(infer_port_kind("number[]"), PortKind::Array);
        assert_eq!(infer_port_kind("Array<string>"), PortKind::Array);
    }

    #[test]
    fn callback_is_function() {
        assert_eq!(infer_port_kind("(x: number) => boolean"), PortKind::Function);
    }

    #[test]
    fn object_and_any_fallbacks() {
        assert_eq!(infer_port_kind("{ x: number }"), PortKind::Object);
        assert_eq!(infer_port_kind("UserRecord"), PortKind::Object);
        assert_eq!(infer_port_kind("any"), PortKind::Any);
        assert_eq!(infer_port_kind("unknown"), PortKind::Any);
    }
}

//! The host-source oracle (`spec.md §9`: "keep the AST queries behind an
//! abstract host-source oracle trait"). The signature extractor (`§4.C`) and
//! doc-comment parser depend only on this trait, not on any concrete host
//! parser, so a stricter AST-backed oracle can replace `LightweightOracle`
//! without touching the rest of the compiler.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub type_text: String,
    pub optional: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnField {
    pub name: String,
    pub type_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSignature {
    pub params: Vec<ParamInfo>,
    pub return_fields: Vec<ReturnField>,
}

/// The abstract query surface the signature extractor and doc-comment
/// parser use to pull structure out of the host language's AST
/// (`spec.md §4.C`, §9).
pub trait HostSourceOracle {
    fn parameters(&self, function_name: &str) -> Vec<ParamInfo>;
    fn return_object_fields(&self, function_name: &str) -> Vec<ReturnField>;
    /// A scope's callback parameter type, by parameter name — absent or
    /// unresolved callback types are a warning at the call site
    /// (`spec.md §4.C`).
    fn callback_param_type(&self, scope: &str, name: &str) -> Option<String>;
    fn callback_return_field_type(&self, scope: &str, name: &str) -> Option<String>;
}

static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)function\s+(\w+)\s*\(([^)]*)\)\s*(?::\s*([^\{]+?))?\s*\{").unwrap()
});
static ARROW_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)const\s+(\w+)\s*=\s*(?:async\s*)?\(([^)]*)\)\s*(?::\s*([^=]+?))?\s*=>").unwrap()
});
static OBJECT_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*:\s*([^,;{}]+)").unwrap());

/// A regex-backed oracle over raw source text: not a true AST, but adequate
/// for signature shapes used in annotated workflows (`spec.md §9`: "a
/// lightweight regex [...] parser can back the same compiler").
#[derive(Debug, Default)]
pub struct LightweightOracle {
    signatures: HashMap<String, FunctionSignature>,
    callbacks: HashMap<String, FunctionSignature>,
}

impl LightweightOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `source` for function/arrow declarations and indexes their
    /// signatures by name.
    pub fn scan(&mut self, source: &str) {
        for caps in FUNCTION_DECL.captures_iter(source) {
            let name = caps.get(1).unwrap().as_str().to_string();
            let params_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let return_text = caps.get(3).map(|m| m.as_str().trim().to_string());
            self.signatures.insert(name, parse_signature(params_text, return_text.as_deref()));
        }
        for caps in ARROW_DECL.captures_iter(source) {
            let name = caps.get(1).unwrap().as_str().to_string();
            let params_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let return_text = caps.get(3).map(|m| m.as_str().trim().to_string());
            self.signatures
                .entry(name)
                .or_insert_with(|| parse_signature(params_text, return_text.as_deref()));
        }
    }

    /// Registers a callback signature explicitly (used when a scope's
    /// callback type can't be recovered from plain text scanning, e.g. an
    /// imported type alias).
    pub fn register_callback(&mut self, scope: impl Into<String>, params_text: &str, return_text: Option<&str>) {
        let sig = parse_signature(params_text, return_text);
        self.callbacks.insert(scope.into(), sig);
    }

    /// Names of every function/arrow declaration `scan` has indexed so far,
    /// used by auto-inference to check for a same-file match (`spec.md §4.D`).
    pub fn known_function_names(&self) -> Vec<String> {
        self.signatures.keys().cloned().collect()
    }
}

fn parse_signature(params_text: &str, return_text: Option<&str>) -> FunctionSignature {
    let mut params = Vec::new();
    for raw in split_top_level(params_text) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (name_part, rest) = match raw.split_once(':') {
            Some((n, r)) => (n.trim(), Some(r.trim())),
            None => (raw, None),
        };
        let (default, name_part) = match name_part.split_once('=') {
            Some((n, d)) => (Some(d.trim().to_string()), n.trim()),
            None => (None, name_part),
        };
        let optional = name_part.ends_with('?');
        let name = name_part.trim_end_matches('?').to_string();
        let type_text = rest.unwrap_or("any").split('=').next().unwrap_or("any").trim().to_string();
        params.push(ParamInfo { name, type_text, optional, default });
    }

    let mut return_fields = Vec::new();
    if let Some(rt) = return_text {
        let rt = rt.trim();
        if rt.starts_with('{') {
            for caps in OBJECT_FIELD.captures_iter(rt) {
                return_fields.push(ReturnField {
                    name: caps.get(1).unwrap().as_str().to_string(),
                    type_text: caps.get(2).unwrap().as_str().trim().to_string(),
                });
            }
        }
    }

    FunctionSignature { params, return_fields }
}

/// Splits on commas that are not nested inside `()`/`{}`/`<>`/`[]`.
fn split_top_level(text: &str) -> Vec<String> {
    let mut depth = 0i32;
    let mut parts = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' | '{' | '<' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | '}' | '>' | ']' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

impl HostSourceOracle for LightweightOracle {
    fn parameters(&self, function_name: &str) -> Vec<ParamInfo> {
        self.signatures.get(function_name).map(|s| s.params.clone()).unwrap_or_default()
    }

    fn return_object_fields(&self, function_name: &str) -> Vec<ReturnField> {
        self.signatures.get(function_name).map(|s| s.return_fields.clone()).unwrap_or_default()
    }

    fn callback_param_type(&self, scope: &str, name: &str) -> Option<String> {
        self.callbacks
            .get(scope)
            .and_then(|sig| sig.params.iter().find(|p| p.name == name))
            .map(|p| p.type_text.clone())
    }

    fn callback_return_field_type(&self, scope: &str, name: &str) -> Option<String> {
        self.callbacks
            .get(scope)
            .and_then(|sig| sig.return_fields.iter().find(|f| f.name == name))
            .map(|f| f.type_text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_plain_function_declaration() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function double(x: number): number { return x * 2; }");
        let params = oracle.parameters("double");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "x");
        assert_eq!(params[0].type_text, "number");
    }

    #[test]
    fn scans_object_return_fields() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function make(): { success: boolean, value: number } { return { success: true, value: 1 }; }");
        let fields = oracle.return_object_fields("make");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "success");
        assert_eq!(fields[1].type_text, "number");
    }

    #[test]
    fn optional_and_default_params() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function greet(name?: string, times: number = 1): string { return name; }");
        let params = oracle.parameters("greet");
        assert!(params[0].optional);
        assert_eq!(params[1].default.as_deref(), Some("1"));
    }

    #[test]
    fn arrow_function_scanned_too() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("const add1 = (x: number): number => x + 1;");
        assert_eq!(oracle.parameters("add1")[0].type_text, "number");
    }
}

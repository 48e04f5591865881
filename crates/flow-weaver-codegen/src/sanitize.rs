//! Identifier sanitization (`spec.md §4.H`): instance ids may contain
//! characters illegal in the target language. Non-alphanumeric characters
//! become `_`; a leading digit gets a `_` prefix.

pub fn sanitize_identifier(id: &str) -> String {
    let mut out: String = id
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// The execution-index variable name allocated for an instance, per
/// `spec.md §4.H` ("allocate an execution index `<id>Idx`").
pub fn index_var(id: &str) -> String {
    format!("{}Idx", sanitize_identifier(id))
}

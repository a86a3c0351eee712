use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;

/// Per-operation fields the extractor knows how to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueField {
    Values,
    Options,
    DcOptions,
    CmdOptions,
}

fn field_of<'a>(operation: &'a Operation, field: ValueField) -> Option<&'a serde_yaml::Value> {
    match field {
        ValueField::Values => operation.values.as_ref(),
        ValueField::Options => operation.options.as_ref(),
        ValueField::DcOptions => operation.dcoptions.as_ref(),
        ValueField::CmdOptions => operation.cmdoptions.as_ref(),
    }
}

fn coerce(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        // Nested collections have no single string form; fall back to the
        // serializer so nothing is silently dropped.
        other => serde_yaml::to_string(other)
            .ok()
            .map(|s| s.trim_end_matches('\n').to_string()),
    }
}

/// Normalize a field into an ordered string list, without expansion.
///
/// Absent field or explicit null yields an empty list, never an error: an
/// empty operation is legal and handled as a no-op downstream. A scalar
/// becomes a one-element list; list elements are coerced element-wise.
pub fn extract(operation: &Operation, field: ValueField) -> Vec<String> {
    match field_of(operation, field) {
        None | Some(serde_yaml::Value::Null) => Vec::new(),
        Some(serde_yaml::Value::Sequence(seq)) => seq.iter().filter_map(coerce).collect(),
        Some(scalar) => coerce(scalar).into_iter().collect(),
    }
}

/// Extract and, when the operation's expansion flag is set, pass every
/// element through `$VAR` expansion. Semicolon splitting is left to the
/// builders, which split differently per type.
pub fn extract_expanded(
    operation: &Operation,
    field: ValueField,
    env: &Environment,
) -> Vec<String> {
    extract(operation, field)
        .into_iter()
        .map(|element| env.expand_if(operation.expandenv, &element))
        .collect()
}

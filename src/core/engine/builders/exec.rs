use crate::core::engine::builders::{split_fragments, tokenize, Plan};
use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;
use crate::core::engine::values::{extract_expanded, ValueField};

/// Direct subprocess invocations: one argument vector per semicolon
/// fragment, whitespace-tokenized without quoting support.
pub fn build(operation: &Operation, env: &Environment) -> Plan {
    let values = extract_expanded(operation, ValueField::Values, env);
    if values.is_empty() {
        return Plan::Skip("# exec command with empty values - skipping execution".to_string());
    }

    let invocations: Vec<Vec<String>> = split_fragments(&values)
        .iter()
        .map(|fragment| tokenize(fragment))
        .filter(|argv| !argv.is_empty())
        .collect();
    Plan::Invocations(invocations)
}

use crate::core::engine::builders::Plan;
use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;
use crate::core::engine::values::{extract_expanded, ValueField};

/// Exactly one `bash -c` invocation over the joined values. Semicolons in
/// the joined string are interpreted by the invoked shell, not the engine.
pub fn build(operation: &Operation, env: &Environment) -> Plan {
    let values = extract_expanded(operation, ValueField::Values, env);
    if values.is_empty() {
        return Plan::Skip("# shell command with empty values - skipping execution".to_string());
    }

    let non_empty: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .collect();
    if non_empty.is_empty() {
        return Plan::Skip(
            "# shell command with only empty values - skipping execution".to_string(),
        );
    }

    let joined = non_empty.join(" ");
    Plan::Invocations(vec![vec![
        "bash".to_string(),
        "-c".to_string(),
        joined,
    ]])
}

use crate::core::engine::builders::{split_fragments, tokenize, Plan};
use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;
use crate::core::engine::values::{extract_expanded, ValueField};

/// Compose invocations around the `docker compose` base vector.
///
/// Unlike every other type, empty values do not skip: the base vector is
/// self-sufficient for sub-commands like `up -d` and runs once on its own.
/// With values present, only per-fragment invocations run.
pub fn build(operation: &Operation, env: &Environment) -> Plan {
    let mut base = vec!["docker".to_string(), "compose".to_string()];

    for option in extract_expanded(operation, ValueField::DcOptions, env) {
        base.extend(tokenize(&option));
    }
    if let Some(sub_command) = operation.command.as_deref() {
        if !sub_command.is_empty() {
            base.push(env.expand_if(operation.expandenv, sub_command));
        }
    }
    for option in extract_expanded(operation, ValueField::CmdOptions, env) {
        base.extend(tokenize(&option));
    }
    if let Some(service) = operation.service.as_deref() {
        if !service.is_empty() {
            base.push(env.expand_if(operation.expandenv, service));
        }
    }

    let values = extract_expanded(operation, ValueField::Values, env);
    if values.is_empty() {
        return Plan::Invocations(vec![base]);
    }

    let invocations: Vec<Vec<String>> = split_fragments(&values)
        .iter()
        .map(|fragment| {
            let mut argv = base.clone();
            argv.extend(tokenize(fragment));
            argv
        })
        .collect();
    Plan::Invocations(invocations)
}

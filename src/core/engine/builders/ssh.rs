use crate::core::engine::builders::{split_fragments, Plan};
use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;
use crate::core::engine::values::{extract_expanded, ValueField};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

const DEFAULT_SSH_PORT: u16 = 22;

/// Remote invocations: one `ssh` call per semicolon fragment, the fragment
/// appended as a single trailing argument so the remote shell parses it.
pub fn build(operation: &Operation, env: &Environment) -> Result<Plan, AppError> {
    let values = extract_expanded(operation, ValueField::Values, env);
    if values.is_empty() {
        return Ok(Plan::Skip(
            "# ssh command with empty values - skipping execution".to_string(),
        ));
    }

    let user = operation.user.as_deref().ok_or_else(|| {
        AppError::new(
            ErrorCategory::ValidationError,
            "ssh command with values requires 'user' field",
        )
    })?;
    let host = operation.host.as_deref().ok_or_else(|| {
        AppError::new(
            ErrorCategory::ValidationError,
            "ssh command with values requires 'host' field",
        )
    })?;
    let port = operation.port.unwrap_or(DEFAULT_SSH_PORT);

    let mut base = vec![
        "ssh".to_string(),
        "-p".to_string(),
        port.to_string(),
        "-l".to_string(),
        env.expand_if(operation.expandenv, user),
        env.expand_if(operation.expandenv, host),
    ];
    for option in extract_expanded(operation, ValueField::Options, env) {
        base.push(option);
    }

    let invocations: Vec<Vec<String>> = split_fragments(&values)
        .into_iter()
        .map(|fragment| {
            let mut argv = base.clone();
            argv.push(fragment);
            argv
        })
        .collect();
    Ok(Plan::Invocations(invocations))
}

use crate::core::engine::builders::{split_fragments, Plan};
use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;
use crate::core::engine::values::{extract_expanded, ValueField};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

/// In-container invocations: each semicolon fragment becomes one `sh -c`
/// call, passed as a single argument so the container shell interprets it.
pub fn build(operation: &Operation, env: &Environment) -> Result<Plan, AppError> {
    let values = extract_expanded(operation, ValueField::Values, env);
    if values.is_empty() {
        // A docker operation without commands has nothing meaningful to run.
        return Ok(Plan::Skip(
            "# docker command with empty values - skipping execution (docker commands require commands to execute)"
                .to_string(),
        ));
    }

    let container = operation.container.as_deref().ok_or_else(|| {
        AppError::new(
            ErrorCategory::ValidationError,
            "docker command with values requires 'container' field",
        )
    })?;
    let sub_command = operation.command.as_deref().ok_or_else(|| {
        AppError::new(
            ErrorCategory::ValidationError,
            "docker command with values requires 'command' field",
        )
    })?;
    let container = env.expand_if(operation.expandenv, container);

    let base: Vec<String> = if sub_command == "run" {
        vec![
            "docker".to_string(),
            "run".to_string(),
            "-it".to_string(),
            "--rm".to_string(),
            container,
            "sh".to_string(),
            "-c".to_string(),
        ]
    } else {
        vec![
            "docker".to_string(),
            sub_command.to_string(),
            container,
            "sh".to_string(),
            "-c".to_string(),
        ]
    };

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

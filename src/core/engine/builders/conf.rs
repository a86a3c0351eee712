use crate::core::engine::builders::{ConfigWrite, Plan};
use crate::core::engine::environment::Environment;
use crate::core::engine::schema::Operation;
use crate::core::template;

const DEFAULT_FILE_MODE: u32 = 0o644;

/// Configuration-file materialization; the one operation type that is not a
/// subprocess.
///
/// Content is a comment line built from the description followed by the
/// declared data. When the expansion flag is set the data goes through
/// whole-document templating against the full environment map, a mechanism
/// deliberately distinct from `$VAR` token expansion. The destination path
/// is always `$VAR`-expanded.
pub fn build(operation: &Operation, env: &Environment) -> Plan {
    let mut confdata = operation.confdata.clone().unwrap_or_default();
    if operation.expandenv && !confdata.is_empty() {
        confdata = template::render(env.variables(), &confdata);
    }
    let confdest = operation.confdest.clone().unwrap_or_default();

    if confdata.is_empty() || confdest.is_empty() {
        return Plan::Skip(
            "# config command with empty data or destination - skipping".to_string(),
        );
    }

    let description = operation.desc.clone().unwrap_or_default();
    let content = format!("# {}\n{}", description, confdata);
    Plan::WriteConfig(ConfigWrite {
        dest: env.expand(&confdest),
        content,
        mode: file_mode(operation),
    })
}

/// Interpret `confperm` as octal digits: YAML `0644` reads as mode `0o644`.
/// Accepts integer or string scalars; anything else falls back to `0644`.
fn file_mode(operation: &Operation) -> u32 {
    match operation.confperm.as_ref() {
        Some(serde_yaml::Value::Number(number)) => number
            .as_u64()
            .and_then(|n| u32::from_str_radix(&n.to_string(), 8).ok())
            .unwrap_or(DEFAULT_FILE_MODE),
        Some(serde_yaml::Value::String(text)) => {
            let digits = text.trim_start_matches("0o");
            u32::from_str_radix(digits, 8).unwrap_or(DEFAULT_FILE_MODE)
        }
        _ => DEFAULT_FILE_MODE,
    }
}

//! Interactive session recording: read commands at a prompt and emit a
//! runnable workflow document of shell operations.

use crate::Result;
use anyhow::Context;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

/// Read commands line by line until `exit` or end of input.
///
/// Blank lines are skipped; everything else is recorded verbatim.
pub fn read_commands<R: BufRead>(reader: &mut R) -> Result<Vec<String>> {
    let mut commands = Vec::new();
    println!("Enter commands (type 'exit' to finish):");
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        let read = reader.read_line(&mut line).context("error reading input")?;
        if read == 0 {
            break;
        }
        let input = line.trim();
        if input == "exit" {
            break;
        }
        if !input.is_empty() {
            commands.push(input.to_string());
        }
    }
    Ok(commands)
}

/// Build a workflow document with one shell operation per recorded command.
pub fn to_document(commands: &[String], shell: &str) -> Value {
    let blocks: Vec<Value> = commands
        .iter()
        .enumerate()
        .map(|(position, command)| {
            json!({
                "type": "shell",
                "name": format!("{}-{}", shell, position + 1),
                "values": [command],
            })
        })
        .collect();
    json!({
        "logging": [
            {"level": "info"},
            {"output": "stdout"},
        ],
        "cmd": blocks,
    })
}

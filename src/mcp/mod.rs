//! Line-delimited JSON-RPC 2.0 tool server over stdio.
//!
//! Exposes workflow execution, generation, and validation to automation
//! clients. Execution output is captured through the in-memory sink so the
//! stdout stream stays valid JSON-RPC.

use crate::core::engine::{schema, Engine};
use crate::generator::WorkflowGenerator;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const PROTOCOL_VERSION: &str = "2024-11-05";
const DEFAULT_GENERATOR_MODEL: &str = "gpt-4o-mini";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        RpcResponse {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        RpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Tool invocation outcome, rendered as MCP tool content.
struct ToolResult {
    text: String,
    is_error: bool,
}

impl ToolResult {
    fn success(text: impl Into<String>) -> Self {
        ToolResult {
            text: text.into(),
            is_error: false,
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        ToolResult {
            text: text.into(),
            is_error: true,
        }
    }

    fn into_value(self) -> Value {
        json!({
            "content": [{"type": "text", "text": self.text}],
            "isError": self.is_error,
        })
    }
}

pub struct ToolServer {
    generator: WorkflowGenerator,
}

impl ToolServer {
    pub fn new() -> Self {
        ToolServer {
            generator: WorkflowGenerator::new(
                std::env::var("OPENAI_API_KEY").ok(),
                DEFAULT_GENERATOR_MODEL.to_string(),
            ),
        }
    }

    /// Handle one JSON-RPC message, returning the serialized response line.
    pub async fn handle_message(&self, message: &str) -> String {
        let request: RpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(err) => {
                let response =
                    RpcResponse::err(Value::Null, PARSE_ERROR, format!("parse error: {}", err));
                return serde_json::to_string(&response).unwrap_or_default();
            }
        };
        let id = request.id.clone().unwrap_or(Value::Null);
        let response = self.handle_request(request, id).await;
        serde_json::to_string(&response).unwrap_or_default()
    }

    async fn handle_request(&self, request: RpcRequest, id: Value) -> RpcResponse {
        match request.method.as_str() {
            "initialize" => RpcResponse::ok(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {
                        "name": "runbook",
                        "version": crate::VERSION,
                    },
                }),
            ),
            "tools/list" => RpcResponse::ok(id, json!({"tools": tool_definitions()})),
            "tools/call" => {
                let params = request.params.unwrap_or(Value::Null);
                let Some(name) = params.get("name").and_then(Value::as_str) else {
                    return RpcResponse::err(id, INVALID_PARAMS, "missing tool name");
                };
                let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
                match self.call_tool(name, &arguments).await {
                    Ok(result) => RpcResponse::ok(id, result.into_value()),
                    Err(message) => RpcResponse::err(id, INVALID_PARAMS, message),
                }
            }
            other => {
                RpcResponse::err(id, METHOD_NOT_FOUND, format!("method not found: {}", other))
            }
        }
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> std::result::Result<ToolResult, String> {
        match name {
            "execute_workflow" => {
                let workflow = require_str(arguments, "workflow")?;
                Ok(self.execute_workflow(workflow.as_bytes()).await)
            }
            "generate_workflow" => {
                let description = require_str(arguments, "description")?;
                Ok(self.generate_workflow(description).await)
            }
            "generate_and_execute_workflow" => {
                let description = require_str(arguments, "description")?;
                let generate_only = arguments
                    .get("generate_only")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if generate_only {
                    return Ok(self.generate_workflow(description).await);
                }
                let document = match self.generator.generate(description).await {
                    Ok(document) => document,
                    Err(err) => return Ok(ToolResult::failure(format!("generation failed: {}", err))),
                };
                let rendered = match serde_yaml::to_string(&document) {
                    Ok(rendered) => rendered,
                    Err(err) => return Ok(ToolResult::failure(format!("failed to render document: {}", err))),
                };
                Ok(self.execute_workflow(rendered.as_bytes()).await)
            }
            "validate_workflow" => {
                let workflow = require_str(arguments, "workflow")?;
                Ok(validate_workflow(workflow.as_bytes()))
            }
            other => Err(format!("unknown tool: {}", other)),
        }
    }

    async fn execute_workflow(&self, input: &[u8]) -> ToolResult {
        let buffer = Arc::new(Mutex::new(String::new()));
        let engine = Engine::new().with_rest_buffer(buffer.clone());
        match engine.execute(input, false).await {
            Ok(()) => {
                let records = buffer.lock().map(|b| b.clone()).unwrap_or_default();
                ToolResult::success(format!("workflow executed\n{}", records))
            }
            Err(err) => ToolResult::failure(format!("workflow rejected: {}", err)),
        }
    }

    async fn generate_workflow(&self, description: &str) -> ToolResult {
        match self.generator.generate(description).await {
            Ok(document) => match serde_yaml::to_string(&document) {
                Ok(rendered) => ToolResult::success(rendered),
                Err(err) => ToolResult::failure(format!("failed to render document: {}", err)),
            },
            Err(err) => ToolResult::failure(format!("generation failed: {}", err)),
        }
    }
}

impl Default for ToolServer {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_workflow(input: &[u8]) -> ToolResult {
    match schema::check(input) {
        Ok(count) => ToolResult::success(format!("workflow valid: {} operations", count)),
        Err(err) => ToolResult::failure(format!("workflow invalid: {}", err)),
    }
}

fn require_str<'a>(arguments: &'a Value, key: &str) -> std::result::Result<&'a str, String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing required argument: {}", key))
}

fn tool_definitions() -> Value {
    json!([
        {
            "name": "execute_workflow",
            "description": "Execute a YAML workflow document and return its records",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "workflow": {
                        "type": "string",
                        "description": "YAML workflow document to execute"
                    }
                },
                "required": ["workflow"]
            }
        },
        {
            "name": "generate_workflow",
            "description": "Generate a workflow document from a natural language description",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Natural language description of the workflow"
                    }
                },
                "required": ["description"]
            }
        },
        {
            "name": "generate_and_execute_workflow",
            "description": "Generate a workflow from a description and execute it",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Natural language description of the workflow"
                    },
                    "generate_only": {
                        "type": "boolean",
                        "description": "Only generate the workflow without executing it"
                    }
                },
                "required": ["description"]
            }
        },
        {
            "name": "validate_workflow",
            "description": "Validate a workflow document without executing it",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "workflow": {
                        "type": "string",
                        "description": "YAML workflow document to validate"
                    }
                },
                "required": ["workflow"]
            }
        }
    ])
}

/// Serve tools over stdin/stdout until end of input.
pub async fn serve_stdio() -> Result<()> {
    let server = ToolServer::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    tracing::info!("tool server listening on stdio");
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = server.handle_message(&line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

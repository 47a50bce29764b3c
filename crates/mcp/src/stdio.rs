//! MCP stdio transport: JSON-RPC 2.0 over a child process.

use std::process::Stdio;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace, warn};

use crate::{Result, SessionError, ToolDescriptor, ToolSession};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Stdio session to an MCP tool server.
///
/// Created closed. `start` spawns the server process and performs the
/// initialize handshake; `list_tools`/`call_tool` fail with `NotStarted`
/// before that. `stop` is idempotent and safe whether or not `start` ever
/// succeeded.
pub struct StdioServer {
    command: String,
    args: Vec<String>,
    conn: Option<Connection>,
}

struct Connection {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl StdioServer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            conn: None,
        }
    }

    /// Spawn the server and complete the MCP handshake.
    pub async fn start(&mut self) -> Result<()> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(SessionError::Spawn)?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");

        let mut conn = Connection {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
        };

        let init = conn
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "formpilot",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await?;
        debug!(
            "connected to {}",
            init["serverInfo"]["name"].as_str().unwrap_or("tool server")
        );

        conn.notify("notifications/initialized", json!({})).await?;

        self.conn = Some(conn);
        Ok(())
    }

    /// Close the session and reap the server process.
    pub async fn stop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            drop(conn.stdin);
            if let Err(e) = conn.child.kill().await {
                trace!("tool server already gone: {}", e);
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(SessionError::NotStarted)
    }
}

impl Connection {
    async fn send(&mut self, message: &Value) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        self.next_id += 1;
        let id = self.next_id;
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        // Servers may interleave notifications and log lines with responses;
        // keep reading until the id matches.
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or(SessionError::Closed)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let message: Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    warn!("skipping non-JSON line from tool server: {}", e);
                    continue;
                }
            };
            if message["id"].as_u64() != Some(id) {
                trace!("skipping message with id {}", message["id"]);
                continue;
            }
            if let Some(error) = message.get("error") {
                return Err(SessionError::Rpc {
                    code: error["code"].as_i64().unwrap_or(0),
                    message: error["message"]
                        .as_str()
                        .unwrap_or("unknown error")
                        .to_string(),
                });
            }
            return Ok(message["result"].clone());
        }
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        }))
        .await
    }
}

#[async_trait::async_trait]
impl ToolSession for StdioServer {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>> {
        let result = self.conn()?.request("tools/list", json!({})).await?;
        let tools = serde_json::from_value(result["tools"].clone())?;
        Ok(tools)
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<Value> {
        debug!("invoking tool {}", name);
        let result = self
            .conn()?
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await
            .map_err(|e| match e {
                SessionError::Rpc { message, .. } => SessionError::ToolExecution {
                    name: name.to_string(),
                    message,
                },
                other => other,
            })?;

        // MCP reports tool-level failures in-band rather than as RPC errors.
        if result["isError"].as_bool().unwrap_or(false) {
            return Err(SessionError::ToolExecution {
                name: name.to_string(),
                message: error_text(&result),
            });
        }

        Ok(result)
    }
}

fn error_text(result: &Value) -> String {
    let texts: Vec<&str> = result["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if texts.is_empty() {
        "tool reported an error".to_string()
    } else {
        texts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_text_joins_blocks() {
        let result = json!({
            "isError": true,
            "content": [
                {"type": "text", "text": "quota exceeded"},
                {"type": "image", "data": "…"},
                {"type": "text", "text": "retry tomorrow"}
            ]
        });
        assert_eq!(error_text(&result), "quota exceeded\nretry tomorrow");
    }

    #[test]
    fn test_error_text_fallback() {
        assert_eq!(error_text(&json!({"isError": true})), "tool reported an error");
    }
}

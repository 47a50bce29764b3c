//! Capability session against a remote tool server.
//!
//! The Forms tool server is an MCP server: it advertises named,
//! schema-described tools and executes them on request. This crate holds the
//! session lifecycle plus the `ToolSession` trait the agent loop consumes,
//! and the stdio transport implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use thiserror::Error;

pub mod stdio;

pub use stdio::StdioServer;

/// Capability session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to launch tool server: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("session not started")]
    NotStarted,

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed server message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tool server closed the connection")]
    Closed,

    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("tool '{name}' failed: {message}")]
    ToolExecution { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// A tool advertised by the server.
///
/// Description and input schema are optional on the wire; defaulting for the
/// model-facing schema happens downstream, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Option<Value>,
}

/// An open session against a tool server.
///
/// The agent loop talks to this trait only, so tests can substitute a
/// scripted session.
#[async_trait]
pub trait ToolSession: Send {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>>;
    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<Value>;
}

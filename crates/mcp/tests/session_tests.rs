//! Session lifecycle tests against a scripted fake MCP server.

use formpilot_mcp::{SessionError, StdioServer, ToolSession};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// A shell-script MCP server with canned responses. The client assigns
/// request ids sequentially from 1, so the replies can be hardcoded.
const FAKE_SERVER: &str = r#"#!/bin/sh
read -r _initialize
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","serverInfo":{"name":"fake-forms"}}}'
read -r _initialized
read -r _list
printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"create_form","description":"Create a new Google Form","inputSchema":{"type":"object","properties":{"title":{"type":"string"}},"required":["title"]}},{"name":"add_text_question"}]}}'
read -r _call
printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"Form created: abc123"}]}}'
read -r _call2
printf '%s\n' '{"jsonrpc":"2.0","id":4,"result":{"isError":true,"content":[{"type":"text","text":"quota exceeded"}]}}'
"#;

fn write_fake_server(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("fake_server.sh");
    std::fs::write(&path, FAKE_SERVER).unwrap();
    path
}

#[tokio::test]
async fn test_not_started_errors() {
    let mut session = StdioServer::new("sh", vec![]);

    let listed = session.list_tools().await;
    assert!(matches!(listed, Err(SessionError::NotStarted)));

    let called = session.call_tool("create_form", json!({})).await;
    assert!(matches!(called, Err(SessionError::NotStarted)));
}

#[tokio::test]
async fn test_start_missing_binary() {
    let mut session = StdioServer::new("/nonexistent/forms-server", vec![]);

    let result = session.start().await;
    assert!(matches!(result, Err(SessionError::Spawn(_))));
    assert!(!session.is_started());

    // stop on a session that never opened must be a no-op
    session.stop().await;
}

#[tokio::test]
async fn test_start_server_exits_immediately() {
    let mut session = StdioServer::new("sh", vec!["-c".to_string(), "exit 0".to_string()]);

    let result = session.start().await;
    assert!(result.is_err());

    session.stop().await;
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let script = write_fake_server(&dir);

    let mut session = StdioServer::new("sh", vec![script.display().to_string()]);
    session.start().await.unwrap();
    assert!(session.is_started());

    session.stop().await;
    assert!(!session.is_started());
    session.stop().await;
}

#[tokio::test]
async fn test_list_and_call_round_trip() {
    let dir = TempDir::new().unwrap();
    let script = write_fake_server(&dir);

    let mut session = StdioServer::new("sh", vec![script.display().to_string()]);
    session.start().await.unwrap();

    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "create_form");
    assert_eq!(
        tools[0].description.as_deref(),
        Some("Create a new Google Form")
    );
    assert!(tools[0].input_schema.is_some());
    assert_eq!(tools[1].name, "add_text_question");
    assert!(tools[1].description.is_none());

    let result = session
        .call_tool("create_form", json!({"title": "Survey"}))
        .await
        .unwrap();
    assert_eq!(result["content"][0]["text"], "Form created: abc123");

    // The second canned reply flags isError; it must surface as a
    // ToolExecution failure carrying the tool name and the content text.
    let failed = session.call_tool("create_form", json!({})).await;
    match failed {
        Err(SessionError::ToolExecution { name, message }) => {
            assert_eq!(name, "create_form");
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("expected ToolExecution, got {:?}", other),
    }

    session.stop().await;
}

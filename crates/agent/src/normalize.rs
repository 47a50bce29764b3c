//! Tool-result normalization.

use serde_json::Value;

/// Flatten a tool result into transcript text.
///
/// Results shaped as MCP content-block lists keep the text of every
/// `"text"` block, newline-joined in block order; other block kinds are
/// skipped. Anything else gets a best-effort rendering. Total over all
/// inputs — a malformed result must not abort the loop.
pub fn tool_result_text(result: &Value) -> String {
    if let Some(blocks) = result.get("content").and_then(Value::as_array) {
        return blocks
            .iter()
            .filter(|b| b["type"] == "text")
            .map(|b| b["text"].as_str().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");
    }

    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Tool catalog: fetched once per run and translated into the model's
//! function-calling schema.

use serde_json::json;
use tracing::debug;

use formpilot_mcp::{ToolDescriptor, ToolSession};
use formpilot_provider::Tool;

use crate::{AgentError, Result};

/// Query the session for its tool set.
///
/// Fetched exactly once per run; tool availability does not change mid-run.
/// Failure here is fatal — a run without a catalog never reaches the model.
pub async fn fetch<S: ToolSession>(session: &mut S) -> Result<Vec<ToolDescriptor>> {
    let descriptors = session
        .list_tools()
        .await
        .map_err(|e| AgentError::Catalog(e.to_string()))?;
    debug!("catalog holds {} tools", descriptors.len());
    Ok(descriptors)
}

/// Translate descriptors into function schemas, preserving catalog order.
/// A missing description becomes the empty string; a missing parameter
/// schema becomes the canonical empty object schema.
pub fn to_function_schema(descriptors: &[ToolDescriptor]) -> Vec<Tool> {
    descriptors
        .iter()
        .map(|d| {
            let description = d.description.clone().unwrap_or_default();
            let parameters = d
                .input_schema
                .clone()
                .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
            Tool::new(d.name.as_str(), description, parameters)
        })
        .collect()
}

//! Agent loop - bounded tool-calling orchestration.

use tracing::{debug, warn};

use formpilot_mcp::ToolSession;
use formpilot_provider::{
    ChatParams, ChatResponse, Message, Provider, Tool, ToolCall, ToolCallDef, ToolChoice,
};

use crate::normalize::tool_result_text;
use crate::prompt::{CONTINUE_NUDGE, SYSTEM_PROMPT};
use crate::{catalog, Result};

/// Iteration bookkeeping for one run. Created at run start, discarded when
/// the loop terminates; nothing survives across runs.
#[derive(Debug, Clone, Copy)]
struct LoopState {
    iterations: u32,
    cap: u32,
}

impl LoopState {
    fn new(cap: u32) -> Self {
        Self { iterations: 0, cap }
    }

    fn exhausted(&self) -> bool {
        self.iterations >= self.cap
    }

    fn advance(&mut self) {
        self.iterations += 1;
    }
}

/// What one run produced
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Final answer text
    pub text: String,
    /// Tool-execution rounds performed
    pub iterations: u32,
    /// The finished transcript, for logging or persistence
    pub transcript: Vec<Message>,
}

/// Drives one conversation against the model, dispatching requested tool
/// calls through the capability session until the model stops asking or the
/// iteration cap is hit.
pub struct AgentLoop<P: Provider> {
    provider: P,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_iterations: u32,
}

impl<P: Provider> AgentLoop<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: 4096,
            max_iterations: 10,
        }
    }

    pub fn with_limits(mut self, max_iterations: u32, temperature: f32, max_tokens: u32) -> Self {
        self.max_iterations = max_iterations;
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Run one request to completion.
    ///
    /// Only catalog and provider failures abort the run; tool-level faults
    /// are reported back to the model as transcript content.
    pub async fn run<S: ToolSession>(&self, session: &mut S, request: &str) -> Result<RunOutput> {
        let descriptors = catalog::fetch(session).await?;
        let tools = catalog::to_function_schema(&descriptors);

        let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(request)];

        let mut response = self.complete(messages.clone(), tools.clone()).await?;

        if !response.has_tool_calls() {
            // The model answered outright; no tools ran, so no finalization
            // pass either.
            let text = response.content.unwrap_or_default();
            messages.push(Message::assistant(text.clone()));
            return Ok(RunOutput {
                text,
                iterations: 0,
                transcript: messages,
            });
        }

        let mut state = LoopState::new(self.max_iterations);

        while !state.exhausted() {
            state.advance();
            debug!("tool round {}", state.iterations);

            // The assistant message is stored only once its batch is about
            // to be answered, so every stored tool call id gets a tool
            // message before the next completion is issued.
            push_assistant(&mut messages, &response);
            self.execute_batch(session, &mut messages, &response.tool_calls)
                .await;

            // One-shot nudge: rides along on this request only.
            let mut request_messages = messages.clone();
            request_messages.push(Message::user(CONTINUE_NUDGE));

            response = self.complete(request_messages, tools.clone()).await?;

            if !response.has_tool_calls() {
                break;
            }
        }

        if response.has_tool_calls() {
            warn!(
                "iteration cap of {} reached with the model still requesting tools",
                state.cap
            );
        }

        // Finalization: one clean no-tools pass over everything that
        // happened, so the answer summarizes partial progress too.
        let final_response = self.complete(messages.clone(), Vec::new()).await?;
        let text = final_response.content.unwrap_or_default();
        messages.push(Message::assistant(text.clone()));

        Ok(RunOutput {
            text,
            iterations: state.iterations,
            transcript: messages,
        })
    }

    async fn complete(&self, messages: Vec<Message>, tools: Vec<Tool>) -> Result<ChatResponse> {
        let params = ChatParams {
            model: self.model.clone(),
            messages,
            tools,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tool_choice: ToolChoice::Auto,
        };

        self.provider
            .chat(params)
            .await
            .map_err(|e| crate::AgentError::Provider(e.to_string()))
    }

    /// Execute one batch strictly in the order the model produced it,
    /// answering every call before returning.
    async fn execute_batch<S: ToolSession>(
        &self,
        session: &mut S,
        messages: &mut Vec<Message>,
        calls: &[ToolCall],
    ) {
        for call in calls {
            let arguments = match serde_json::from_str(&call.arguments) {
                Ok(value) => value,
                Err(e) => {
                    warn!("unparseable arguments for {}: {}", call.name, e);
                    serde_json::json!({})
                }
            };

            debug!("executing {}({})", call.name, arguments);
            match session.call_tool(&call.name, arguments).await {
                Ok(result) => {
                    let text = tool_result_text(&result);
                    messages.push(Message::tool(call.id.as_str(), call.name.as_str(), text));
                }
                Err(e) => {
                    warn!("tool {} failed: {}", call.name, e);
                    messages.push(Message::tool(
                        call.id.as_str(),
                        call.name.as_str(),
                        format!("Error: {}", e),
                    ));
                }
            }
        }
    }
}

fn push_assistant(messages: &mut Vec<Message>, response: &ChatResponse) {
    let defs: Vec<ToolCallDef> = response
        .tool_calls
        .iter()
        .map(|tc| ToolCallDef::new(tc.id.as_str(), tc.name.as_str(), tc.arguments.as_str()))
        .collect();

    let mut msg = Message::assistant(response.content.clone().unwrap_or_default());
    msg.tool_calls = Some(defs);
    messages.push(msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_counts_to_cap() {
        let mut state = LoopState::new(3);
        assert!(!state.exhausted());

        state.advance();
        state.advance();
        assert!(!state.exhausted());

        state.advance();
        assert!(state.exhausted());
        assert_eq!(state.iterations, 3);
    }

    #[test]
    fn test_loop_state_zero_cap_is_exhausted() {
        let state = LoopState::new(0);
        assert!(state.exhausted());
    }

    #[test]
    fn test_push_assistant_echoes_calls() {
        let response = ChatResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "create_form".to_string(),
                arguments: r#"{"title":"Survey"}"#.to_string(),
            }],
            finish_reason: "tool_calls".to_string(),
            usage: Default::default(),
        };

        let mut messages = Vec::new();
        push_assistant(&mut messages, &response);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "assistant");
        assert_eq!(messages[0].content, Some(String::new()));
        let defs = messages[0].tool_calls.as_ref().unwrap();
        assert_eq!(defs[0].id, "call_1");
        assert_eq!(defs[0].function.arguments, r#"{"title":"Survey"}"#);
    }
}

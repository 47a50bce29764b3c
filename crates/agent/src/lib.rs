//! Form-building agent core.
//!
//! Seeds a conversation with the user's request, lets the model call tools
//! from the Forms server, and loops until the model is done or the
//! iteration cap is hit.

use thiserror::Error;

pub mod catalog;
pub mod loop_agent;
pub mod normalize;
pub mod prompt;

pub use loop_agent::{AgentLoop, RunOutput};

/// Run-level failures.
///
/// Everything else — unparseable arguments, failed tool calls, odd result
/// shapes — is absorbed into the transcript so the model can correct course.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("tool catalog unavailable: {0}")]
    Catalog(String),

    #[error("model request failed: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;

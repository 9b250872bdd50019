//! Shared prompt-validation contract and the prompt-improver shape.
//!
//! The improvement service itself (its HTTP client, timeout handling,
//! retry policy) lives outside this crate; the router only consumes
//! its validated-prompt helper and its success/failure shape.

use crate::error::RouterError;

/// Hard cap shared with the prompt-improvement collaborator.
pub const MAX_PROMPT_CHARS: usize = 5000;

/// Rejects empty, whitespace-only and over-long prompts. The length
/// cap applies to the prompt with surrounding whitespace stripped.
pub fn validate_prompt(prompt: &str) -> Result<(), RouterError> {
    if prompt.is_empty() {
        return Err(RouterError::Validation("prompt must not be empty".to_string()));
    }
    let stripped = prompt.trim();
    if stripped.is_empty() {
        return Err(RouterError::Validation(
            "prompt must not be whitespace only".to_string(),
        ));
    }
    if stripped.chars().count() > MAX_PROMPT_CHARS {
        return Err(RouterError::Validation(format!(
            "prompt too long (max {MAX_PROMPT_CHARS} characters)"
        )));
    }
    Ok(())
}

/// Outcome shape returned by the prompt-improvement service.
#[derive(Debug, Clone)]
pub struct ImproveOutcome {
    pub success: bool,
    pub improved_prompt: Option<String>,
    pub error: Option<String>,
}

/// External collaborator that rewrites prompts before routing.
/// Implementations carry their own timeout; a failure here must never
/// affect prediction or the model cache.
pub trait PromptImprover: Send + Sync {
    fn improve(&self, prompt: &str) -> ImproveOutcome;
}

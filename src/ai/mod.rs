/// Generative-model layer: client, prompts, and reply handling.
///
/// ```text
///   prompt ──▶ TextModel::generate ──▶ free-form text
///                                          │
///                                          ▼
///                                   json::extract_json
///                                          │
///                                          ▼
///                               analysis::AnalysisRecord
/// ```

pub mod analysis;
pub mod gemini;
pub mod json;
pub mod prompt;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("No valid JSON found in AI response.")]
    NoJson,

    #[error("Unexpected AI response: {0}")]
    Malformed(String),
}

/// Anything that turns one text prompt into one text reply.
pub trait TextModel {
    fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{AiError, TextModel};

    /// Replays canned replies in order and records every prompt it was given.
    #[derive(Default)]
    pub struct ScriptedModel {
        replies: RefCell<VecDeque<Result<String, AiError>>>,
        pub prompts: RefCell<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(replies: Vec<Result<String, AiError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                prompts: RefCell::default(),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.borrow().len()
        }
    }

    impl TextModel for ScriptedModel {
        fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(AiError::EmptyResponse))
        }
    }
}

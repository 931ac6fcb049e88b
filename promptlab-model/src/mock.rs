//! Mock generator for tests and offline demos.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{ModelError, Result};
use crate::generator::{GenerationRequest, TextGenerator};

enum Behavior {
    Respond(String),
    Echo,
    Fail(Box<dyn Fn() -> ModelError + Send + Sync>),
}

/// A [`TextGenerator`] that returns canned output and records every prompt.
pub struct MockGenerator {
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Always answer with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::from_behavior(Behavior::Respond(response.into()))
    }

    /// Answer with the prompt that was sent.
    pub fn echo() -> Self {
        Self::from_behavior(Behavior::Echo)
    }

    /// Fail every call with the error produced by `make_error`.
    pub fn failing(make_error: impl Fn() -> ModelError + Send + Sync + 'static) -> Self {
        Self::from_behavior(Behavior::Fail(Box::new(make_error)))
    }

    fn from_behavior(behavior: Behavior) -> Self {
        Self { behavior, prompts: Mutex::new(Vec::new()) }
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.prompts.lock().await.push(request.prompt.clone());
        match &self.behavior {
            Behavior::Respond(text) => Ok(text.clone()),
            Behavior::Echo => Ok(request.prompt.clone()),
            Behavior::Fail(make_error) => Err(make_error()),
        }
    }
}

//! Mock implementations for testing
//!
//! Provides mock LlmProvider and PathwayGenerator implementations so the
//! task lifecycle can be exercised without network access.

use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmError, LlmProvider, TokenUsage};
use crate::pathways::PathwayGenerator;
use crate::profile::UserProfile;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock LLM provider for testing
#[derive(Debug)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub current_response: Arc<Mutex<usize>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub should_fail: bool,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            current_response: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Prompts received so far, in call order
    pub async fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().await.extend(
            request
                .messages
                .iter()
                .map(|message| message.content.clone()),
        );

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let mut current = self.current_response.lock().await;
        let response_idx = *current % self.responses.len().max(1);
        *current += 1;

        let content = if self.responses.is_empty() {
            "Mock response".to_string()
        } else {
            self.responses[response_idx].clone()
        };

        Ok(CompletionResponse {
            content: Some(content),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        })
    }
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Respond(String),
    /// Reply with a rendering of the profile so callers can tell results apart
    Echo,
    Fail(LlmError),
}

/// Mock pathway generator recording every profile it is asked about
#[derive(Debug)]
pub struct MockPathwayGenerator {
    behavior: MockBehavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
    profiles: Mutex<Vec<UserProfile>>,
}

impl MockPathwayGenerator {
    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
            profiles: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(text: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Respond(text.into()))
    }

    pub fn echo() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    pub fn failing(error: LlmError) -> Self {
        Self::with_behavior(MockBehavior::Fail(error))
    }

    /// Sleep before answering, to simulate a slow model
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn get_profiles(&self) -> Vec<UserProfile> {
        self.profiles.lock().await.clone()
    }

    /// Text produced by [`MockPathwayGenerator::echo`] for a profile
    pub fn echo_text(profile: &UserProfile) -> String {
        format!(
            "pathway profession={} origin={} destination={} budget={}",
            profile.profession, profile.origin, profile.destination, profile.budget
        )
    }
}

#[async_trait]
impl PathwayGenerator for MockPathwayGenerator {
    async fn generate(&self, profile: &UserProfile) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profiles.lock().await.push(profile.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Respond(text) => Ok(text.clone()),
            MockBehavior::Echo => Ok(Self::echo_text(profile)),
            MockBehavior::Fail(error) => Err(error.clone()),
        }
    }
}

//! Migration pathway generation
//!
//! Turns a [`UserProfile`] into a prompt and asks the configured LLM for a
//! single recommended migration option.

use crate::llm::provider::{CompletionRequest, LlmError, LlmProvider, Message};
use crate::profile::UserProfile;
use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, info};

const PROMPT_PREAMBLE: &str = "You are a migration planning expert. Provide personalized migration pathway recommendations in a well-structured markdown format.

CRITICAL BEHAVIOR RULES:
- Never ask the user for additional information.
- If any profile fields are missing (profession, origin, destination, budget), proceed with best available information and reasonable assumptions.
- Output exactly one best migration option. Do not include follow-up questions.

USER PROFILE:
";

const PROMPT_INSTRUCTIONS: &str = "
INSTRUCTIONS:
Research and provide the SINGLE most suitable migration pathway for this profile. If some fields are missing, infer typical constraints for 2024–2025 and proceed without asking questions. Format as follows:

# Best Migration Option: [Visa Name]

Brief overview of why this is the best option for the profile (1-2 sentences).

**Key Details:**
- Processing time: [Duration]
- Cost: [USD range]
- Success rate: [High/Medium/Low]
- Main requirements: [2-3 key points]

Next step: [Most important action to take]

IMPORTANT: Be concise. Focus on 2024-2025 requirements. Consider budget constraints. Do not ask for more details.

Generate the response now:";

/// Anything that can produce recommendation text for a profile
#[async_trait]
pub trait PathwayGenerator: Send + Sync {
    async fn generate(&self, profile: &UserProfile) -> Result<String, LlmError>;
}

/// Build the model prompt; fields the extractor did not find are omitted
pub fn build_prompt(profile: &UserProfile) -> String {
    let mut prompt = String::from(PROMPT_PREAMBLE);

    // Writing to a String cannot fail
    if !profile.profession.is_empty() {
        let _ = writeln!(prompt, "- Profession: {}", profile.profession);
    }
    if !profile.origin.is_empty() {
        let _ = writeln!(prompt, "- Current Country: {}", profile.origin);
    }
    if !profile.destination.is_empty() {
        let _ = writeln!(prompt, "- Destination Country: {}", profile.destination);
    }
    if profile.budget > 0 {
        let _ = writeln!(prompt, "- Budget: ${} USD", profile.budget);
    }

    prompt.push_str(PROMPT_INSTRUCTIONS);
    prompt
}

/// Pathway generator backed by an [`LlmProvider`]
pub struct LlmPathwayGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmPathwayGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }
}

#[async_trait]
impl PathwayGenerator for LlmPathwayGenerator {
    async fn generate(&self, profile: &UserProfile) -> Result<String, LlmError> {
        let prompt = build_prompt(profile);
        debug!(prompt_length = prompt.len(), "Built pathway prompt");

        let request = CompletionRequest {
            messages: vec![Message::user(prompt)],
            model: self.model.clone(),
        };

        let response = self.provider.complete(request).await?;
        info!(
            provider = self.provider.name(),
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Pathway generated"
        );

        // An empty first part is still an answer; only a missing one is an error
        response
            .content
            .ok_or_else(|| LlmError::InvalidResponse("no response generated from API".to_string()))
    }
}

//! Agent card served at `/.well-known/agent.json`

use crate::config::AgentSection;
use serde::{Deserialize, Serialize};

pub const AGENT_CARD_PATH: &str = ".well-known/agent.json";

const SKILL_ID: &str = "get_migration_pathways";
const SKILL_NAME: &str = "Get AI-Generated Migration Pathways";
const SKILL_DESCRIPTION: &str = "Provides real-time, AI-generated migration pathways based on \
    profession, destination country, origin, and budget using Google's Gemini LLM";
const SKILL_TAGS: &[&str] = &[
    "migration",
    "visa",
    "relocation",
    "immigration",
    "ai-powered",
    "real-time",
];
const SKILL_EXAMPLES: &[&str] = &[
    "I'm a software engineer from Nigeria, want to move to Canada, budget $5000",
    "Data scientist looking to relocate to USA",
    "How can I migrate to Germany as a software developer?",
    "What are my options to move to Australia as an engineer with $10k budget?",
    "Nurse from India wanting to move to UK",
    "Teacher relocating from Philippines to Canada",
];
const IO_MODES: &[&str] = &["text", "text/plain"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub capabilities: Capabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<Skill>,
}

/// Optional protocol features; this agent answers synchronously only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub streaming: bool,
    pub push_notifications: bool,
    pub state_transition_history: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl AgentCard {
    pub fn from_config(agent: &AgentSection) -> Self {
        Self {
            name: agent.name.clone(),
            description: agent.description.clone(),
            url: agent.url.clone(),
            version: agent.version.clone(),
            capabilities: Capabilities::default(),
            default_input_modes: owned(IO_MODES),
            default_output_modes: owned(IO_MODES),
            skills: vec![Skill {
                id: SKILL_ID.to_string(),
                name: SKILL_NAME.to_string(),
                description: SKILL_DESCRIPTION.to_string(),
                tags: owned(SKILL_TAGS),
                examples: owned(SKILL_EXAMPLES),
            }],
        }
    }
}

impl Default for AgentCard {
    fn default() -> Self {
        Self::from_config(&AgentSection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::extract_profile;

    #[test]
    fn test_default_card_json() {
        let value = serde_json::to_value(AgentCard::default()).unwrap();

        assert_eq!(value["name"], "Migration Pathways Agent");
        assert_eq!(value["version"], "2.0.0");
        assert_eq!(value["url"], "http://localhost:8080");
        assert_eq!(value["capabilities"]["streaming"], false);
        assert_eq!(value["capabilities"]["pushNotifications"], false);
        assert_eq!(value["capabilities"]["stateTransitionHistory"], false);
        assert_eq!(value["defaultInputModes"][1], "text/plain");
        assert_eq!(value["skills"][0]["id"], "get_migration_pathways");
        assert_eq!(value["skills"][0]["tags"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_card_uses_configured_identity() {
        let agent = AgentSection {
            url: "https://pathways.example.org".to_string(),
            version: "2.1.0".to_string(),
            ..AgentSection::default()
        };
        let card = AgentCard::from_config(&agent);

        assert_eq!(card.url, "https://pathways.example.org");
        assert_eq!(card.version, "2.1.0");
    }

    #[test]
    fn test_advertised_examples_extract_a_destination() {
        for example in SKILL_EXAMPLES {
            assert!(
                !extract_profile(example).destination.is_empty(),
                "no destination found in {example:?}"
            );
        }
    }
}

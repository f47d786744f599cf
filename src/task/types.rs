//! Task, message and artifact types as they appear on the wire
//!
//! Field names follow the agent-to-agent protocol's camelCase JSON shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to the single artifact of a completed task
pub const RECOMMENDATION_ARTIFACT_NAME: &str = "Migration Pathway Recommendation";

const TASK_KIND: &str = "task";
const MESSAGE_KIND: &str = "message";
const TEXT_PART: &str = "text";

/// Lifecycle state of a task
///
/// Only forward transitions exist: `Working -> Completed` or
/// `Working -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Working,
    Completed,
    Failed,
}

impl TaskState {
    /// Terminal states are never mutated again
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Working => "working",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One content part of a message or artifact
///
/// Inbound parts may carry `type`, the newer `kind` spelling, or both;
/// only `text` parts contribute to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            part_type: Some(TEXT_PART.to_string()),
            kind: None,
            text: Some(text.into()),
        }
    }

    /// Either spelling naming `text` is enough
    pub fn is_text(&self) -> bool {
        [&self.part_type, &self.kind]
            .into_iter()
            .any(|tag| tag.as_deref() == Some(TEXT_PART))
    }
}

/// Inbound user message carried by `tasks/send` and `message/send`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Message {
    /// Build a user message from a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
            ..Default::default()
        }
    }

    /// A message is acceptable when it names a role or carries any part
    pub fn is_well_formed(&self) -> bool {
        let has_role = self.role.as_deref().is_some_and(|r| !r.trim().is_empty());
        has_role || !self.parts.is_empty()
    }

    /// Space-join every text part and trim the result
    ///
    /// Non-text parts are skipped. A message without text parts yields an
    /// empty string.
    pub fn query_text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| part.is_text())
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Agent-authored message attached to a task status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub kind: String,
    pub role: String,
    pub parts: Vec<Part>,
    pub message_id: String,
    pub task_id: String,
}

impl StatusMessage {
    pub fn agent_text(task_id: &str, text: impl Into<String>) -> Self {
        Self {
            kind: MESSAGE_KIND.to_string(),
            role: "agent".to_string(),
            parts: vec![Part::text(text)],
            message_id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
        }
    }

    /// First text part, if any
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    /// RFC 3339 timestamp of the transition into `state`
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<StatusMessage>,
}

impl TaskStatus {
    fn at(state: TaskState, now: DateTime<Utc>, message: Option<StatusMessage>) -> Self {
        Self {
            state,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            message,
        }
    }
}

/// Named output attached to a completed task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    pub name: String,
    pub parts: Vec<Part>,
}

impl Artifact {
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            artifact_id: Some(Uuid::new_v4().to_string()),
            name: name.into(),
            parts: vec![Part::text(text)],
        }
    }
}

/// One tracked unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub kind: String,
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Fresh task in the `working` state
    pub fn working(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            kind: TASK_KIND.to_string(),
            id: id.into(),
            status: TaskStatus::at(TaskState::Working, now, None),
            artifacts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> TaskState {
        self.status.state
    }

    /// Move to `completed`, recording the text as both the status message
    /// and the recommendation artifact
    pub fn complete(mut self, text: &str) -> Self {
        let now = Utc::now();
        let message = StatusMessage::agent_text(&self.id, text);
        self.status = TaskStatus::at(TaskState::Completed, now, Some(message));
        self.artifacts = vec![Artifact::text(RECOMMENDATION_ARTIFACT_NAME, text)];
        self.updated_at = now;
        self
    }

    /// Move to `failed` with the reason as the status message
    pub fn fail(mut self, reason: &str) -> Self {
        let now = Utc::now();
        let message = StatusMessage::agent_text(&self.id, reason);
        self.status = TaskStatus::at(TaskState::Failed, now, Some(message));
        self.updated_at = now;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_text_joins_text_parts_only() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "parts": [
                {"type": "text", "text": "  nurse from India "},
                {"type": "file", "uri": "file:///cv.pdf"},
                {"kind": "text", "text": "moving to UK  "}
            ]
        }))
        .unwrap();

        assert_eq!(message.query_text(), "nurse from India  moving to UK");
    }

    #[test]
    fn test_part_with_both_type_and_kind() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "parts": [
                {"kind": "text", "type": "text", "text": "nurse to UK"},
                {"kind": "file", "type": "file", "text": "ignored"},
                {"kind": "text", "text": "with $8k"}
            ]
        }))
        .unwrap();

        assert!(message.parts[0].is_text());
        assert!(!message.parts[1].is_text());
        assert_eq!(message.query_text(), "nurse to UK with $8k");
    }

    #[test]
    fn test_query_text_empty_without_text_parts() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "parts": [{"type": "data", "data": {"a": 1}}]
        }))
        .unwrap();

        assert!(message.is_well_formed());
        assert_eq!(message.query_text(), "");
    }

    #[test]
    fn test_message_well_formedness() {
        assert!(!Message::default().is_well_formed());
        assert!(Message {
            role: Some("user".to_string()),
            ..Default::default()
        }
        .is_well_formed());
        assert!(!Message {
            role: Some("   ".to_string()),
            ..Default::default()
        }
        .is_well_formed());
        assert!(Message::user_text("hi").is_well_formed());
    }

    #[test]
    fn test_working_task_shape() {
        let task = Task::working("task-1");
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["kind"], "task");
        assert_eq!(value["id"], "task-1");
        assert_eq!(value["status"]["state"], "working");
        assert!(value["status"].get("message").is_none());
        assert_eq!(value["artifacts"], json!([]));
        assert!(value["createdAt"].is_string());
        assert!(value["updatedAt"].is_string());
    }

    #[test]
    fn test_complete_attaches_message_and_artifact() {
        let task = Task::working("task-2").complete("# Best Migration Option: Express Entry");

        assert_eq!(task.state(), TaskState::Completed);
        assert!(task.updated_at >= task.created_at);
        let message = task.status.message.as_ref().unwrap();
        assert_eq!(message.role, "agent");
        assert_eq!(message.task_id, "task-2");
        assert_eq!(
            message.text(),
            Some("# Best Migration Option: Express Entry")
        );
        assert_eq!(task.artifacts.len(), 1);
        assert_eq!(task.artifacts[0].name, RECOMMENDATION_ARTIFACT_NAME);

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["artifacts"][0]["parts"][0]["type"], "text");
        assert!(value["artifacts"][0]["artifactId"].is_string());
        assert_eq!(value["status"]["message"]["kind"], "message");
    }

    #[test]
    fn test_fail_keeps_artifacts_empty() {
        let task = Task::working("task-3").fail("Failed to generate pathways: boom");

        assert_eq!(task.state(), TaskState::Failed);
        assert!(task.state().is_terminal());
        assert!(task.artifacts.is_empty());
        assert_eq!(
            task.status.message.unwrap().text(),
            Some("Failed to generate pathways: boom")
        );
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskState::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(TaskState::Failed.to_string(), "failed");
        assert!(!TaskState::Working.is_terminal());
    }
}

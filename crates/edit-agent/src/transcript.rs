use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation history sent to the engine on every call.
/// Lives in memory for the lifetime of the controller; invariant: one
/// system message followed by alternating user/assistant pairs. A cycle
/// that fails before the assistant entry lands rolls its user entry back
/// so the pairing never goes dangling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Removes a trailing user entry left behind by a failed cycle.
    pub fn rollback_user(&mut self) {
        if matches!(
            self.messages.last(),
            Some(ChatMessage {
                role: Role::User,
                ..
            })
        ) {
            self.messages.pop();
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    /// True when every user entry has a matching assistant entry.
    pub fn is_balanced(&self) -> bool {
        self.count_role(Role::User) == self.count_role(Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_removes_only_a_trailing_user_entry() {
        let mut transcript = Transcript::with_system_prompt("sys");
        transcript.push_user("a");
        transcript.push_assistant("b");
        transcript.rollback_user();
        assert_eq!(transcript.len(), 3);

        transcript.push_user("c");
        transcript.rollback_user();
        assert_eq!(transcript.len(), 3);
        assert!(transcript.is_balanced());
    }

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::assistant("x");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}

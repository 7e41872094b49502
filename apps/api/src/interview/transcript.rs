use serde::Serialize;
use thiserror::Error;

use crate::interview::models::Message;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("message content cannot be empty")]
pub struct EmptyMessage;

/// Append-only, ordered log of the conversation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages in conversation order, for display.
    pub fn render(&self) -> &[Message] {
        &self.messages
    }

    /// One `Role: content` line per message, in order. Used as prompt context.
    pub fn serialize(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role().as_str(), m.content()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::Role;

    fn sample() -> Transcript {
        let mut t = Transcript::new();
        t.append(Message::assistant("Welcome").unwrap());
        t.append(Message::candidate("Hello there").unwrap());
        t.append(Message::assistant("Question 1?").unwrap());
        t
    }

    #[test]
    fn test_render_preserves_order() {
        let t = sample();
        let roles: Vec<Role> = t.render().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::Candidate, Role::Assistant]);
        assert_eq!(t.last().unwrap().content(), "Question 1?");
    }

    #[test]
    fn test_serialize_tags_roles() {
        assert_eq!(
            sample().serialize(),
            "Assistant: Welcome\nCandidate: Hello there\nAssistant: Question 1?"
        );
        assert_eq!(Transcript::new().serialize(), "");
    }

    #[test]
    fn test_json_shape_is_role_tagged_list() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json[1]["role"], "candidate");
        assert_eq!(json[1]["content"], "Hello there");
        assert_eq!(json.as_array().unwrap().len(), 3);
    }
}

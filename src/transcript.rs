use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agents::RoleName;

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Role(RoleName),
}

impl Author {
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Role(role) => role.canonical_name(),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One attributed entry. Fields are private so an appended message cannot be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    author: Author,
    content: String,
    sequence_index: usize,
}

impl Message {
    pub fn author(&self) -> Author {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    #[allow(dead_code)]
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }
}

/// Append-only conversation shared by every role in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn seeded(brief: impl Into<String>) -> Self {
        let mut transcript = Self::default();
        transcript.append(Author::User, brief);
        transcript
    }

    /// Appends a message and returns a reference to it. The sequence index is
    /// always the position in the transcript.
    pub fn append(&mut self, author: Author, content: impl Into<String>) -> &Message {
        let sequence_index = self.messages.len();
        self.messages.push(Message {
            author,
            content: content.into(),
            sequence_index,
        });
        &self.messages[sequence_index]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages written by roles, i.e. everything except the seed brief.
    pub fn role_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|message| matches!(message.author, Author::Role(_)))
    }

    /// Plain-text rendering used both as LLM context and for CLI display.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|message| format!("{}: {}", message.author, message.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_user_authored_at_index_zero() {
        let transcript = Transcript::seeded("Create a marketing campaign for a SmartBottle.");
        let first = &transcript.messages()[0];

        assert_eq!(first.author(), Author::User);
        assert_eq!(first.sequence_index(), 0);
        assert_eq!(transcript.role_messages().count(), 0);
    }

    #[test]
    fn append_assigns_positional_indices() {
        let mut transcript = Transcript::seeded("brief");
        transcript.append(Author::Role(RoleName::ContentWriter), "slogans");
        transcript.append(Author::Role(RoleName::GraphicDesigner), "palette");

        let indices: Vec<usize> = transcript
            .messages()
            .iter()
            .map(Message::sequence_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(transcript.role_messages().count(), 2);
    }

    #[test]
    fn render_uses_canonical_labels() {
        let mut transcript = Transcript::seeded("brief");
        transcript.append(Author::Role(RoleName::DataAnalyst), "  trends look good \n");

        assert_eq!(transcript.render(), "user: brief\n\nDataAnalyst: trends look good");
    }
}

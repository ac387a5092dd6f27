//! Payload types carried by branches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability required from entry labels and line payloads.
///
/// Trees copy payloads on insertion and compare them structurally, so both
/// cloning and value equality are needed. Serialization bounds are added only
/// where a tree is encoded or decoded.
pub trait Payload: Clone + PartialEq + fmt::Debug {}

impl<T: Clone + PartialEq + fmt::Debug> Payload for T {}

/// Something that can be spoken during a walkthrough.
pub trait Utterance {
    /// Who says it, if the payload knows.
    fn speaker(&self) -> Option<&str>;

    fn text(&self) -> &str;
}

/// A single line of dialog: who speaks and what is said.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogLine {
    /// Speaker id, e.g. "Npc" or "Player"
    pub id: String,
    pub content: String,
}

impl DialogLine {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

impl fmt::Display for DialogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.content)
    }
}

impl Utterance for DialogLine {
    fn speaker(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn text(&self) -> &str {
        &self.content
    }
}

impl Utterance for String {
    fn speaker(&self) -> Option<&str> {
        None
    }

    fn text(&self) -> &str {
        self
    }
}

impl<S: Into<String>, C: Into<String>> From<(S, C)> for DialogLine {
    fn from((id, content): (S, C)) -> Self {
        Self::new(id, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tuple_when_converted_then_keeps_speaker_and_text() {
        let line: DialogLine = ("Cat", "Meow").into();
        assert_eq!(line.speaker(), Some("Cat"));
        assert_eq!(line.text(), "Meow");
        assert_eq!(line.to_string(), "Cat: Meow");
    }

    #[test]
    fn given_plain_string_when_spoken_then_has_no_speaker() {
        let line = "Hello there".to_string();
        assert_eq!(line.speaker(), None);
        assert_eq!(line.text(), "Hello there");
    }
}

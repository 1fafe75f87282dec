//! Conversation messages exchanged over [`EventType::Message`](crate::EventType::Message).

use std::fmt;
use std::time::SystemTime;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    System,
    Human,
    Assistant,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::System => "system",
            Source::Human => "human",
            Source::Assistant => "assistant",
        })
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: Source,
    /// Author name (agent name for assistant messages).
    pub from: String,
    pub text: String,
    pub at: SystemTime,
}

impl Message {
    pub fn new(source: Source, from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source,
            from: from.into(),
            text: text.into(),
            at: SystemTime::now(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Source::System, "system", text)
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Source::Human, "human", text)
    }

    pub fn assistant(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Source::Assistant, from, text)
    }

    /// True for slash-commands such as `/status` or `/start echo`.
    ///
    /// Commands are handled by the host, so agents skip them.
    pub fn is_command(&self) -> bool {
        self.text.trim_start().starts_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_commands() {
        assert!(Message::human("/status").is_command());
        assert!(Message::human("  /start echo ").is_command());
        assert!(!Message::human("hello /status").is_command());
        assert!(Message::human("/").is_command());
        assert!(!Message::human("").is_command());
    }

    #[test]
    fn constructors_set_source_and_author() {
        let m = Message::assistant("echo", "hi");
        assert_eq!(m.source, Source::Assistant);
        assert_eq!(m.from, "echo");
        assert_eq!(Message::system("x").source.to_string(), "system");
    }
}

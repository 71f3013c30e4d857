//! Voice commands
//!
//! Turns utterance text into a structured [`VoiceCommand`] and applies it to
//! the application state.

mod dispatch;
mod parser;

use serde::{Deserialize, Serialize};

pub use dispatch::dispatch;
pub use parser::{DEFAULT_WAKE_PHRASES, WakePhrases, parse, strip_wake_phrase};

/// Whose list or calendar a command targets (e.g. "chris")
///
/// Open identifier; the parser hands it over lowercased, stores keep it as given.
pub type Person = String;

/// A structured command recognised from an utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceCommand {
    /// Append a todo to a person's list
    AddTodo {
        /// Owner of the list
        person: Person,
        /// Todo text
        text: String,
    },
    /// Show the calendar overlay
    ShowCalendar,
    /// Hide the calendar overlay
    HideCalendar,
    /// Advance the slideshow
    NextSlide,
    /// Go back one slide
    PreviousSlide,
    /// Open the todo view, optionally scoped to one person
    ShowTodos {
        /// Person filter; `None` shows everyone's todos
        #[serde(default, skip_serializing_if = "Option::is_none")]
        person: Option<Person>,
    },
    /// Mark a todo done by (partial) text
    CompleteTodo {
        /// Search text matched against todo text
        todo_text: String,
    },
    /// Toggle between dashboard and frame mode
    SwitchMode,
    /// Open the settings surface
    OpenSettings,
    /// Nothing in the grammar matched
    Unknown {
        /// The utterance as heard
        raw_text: String,
    },
}

impl VoiceCommand {
    /// Short stable name for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddTodo { .. } => "add_todo",
            Self::ShowCalendar => "show_calendar",
            Self::HideCalendar => "hide_calendar",
            Self::NextSlide => "next_slide",
            Self::PreviousSlide => "previous_slide",
            Self::ShowTodos { .. } => "show_todos",
            Self::CompleteTodo { .. } => "complete_todo",
            Self::SwitchMode => "switch_mode",
            Self::OpenSettings => "open_settings",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Whether the grammar failed to recognise the utterance
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let cmd = VoiceCommand::AddTodo {
            person: "chris".to_string(),
            text: "milk".to_string(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "ADD_TODO");
        assert_eq!(json["person"], "chris");

        let json = serde_json::to_value(VoiceCommand::ShowTodos { person: None }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "SHOW_TODOS" }));
    }

    #[test]
    fn test_kind() {
        assert_eq!(VoiceCommand::NextSlide.kind(), "next_slide");
        assert!(
            VoiceCommand::Unknown {
                raw_text: "x".to_string()
            }
            .is_unknown()
        );
    }
}

//! Application state consumed by voice commands
//!
//! The pipeline only mutates state through [`AppState`]. Persistence,
//! calendar sync and rendering belong to other collaborators.

mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::MemoryStore;

use crate::command::Person;

/// A todo entry on someone's list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: String,
    /// Todo text as dictated
    pub text: String,
    /// List owner
    pub person: Person,
    /// Whether it has been checked off
    pub completed: bool,
    /// When the todo was added
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Create an incomplete todo with a fresh id
    #[must_use]
    pub fn new(person: impl Into<Person>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            person: person.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Top-level display layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Calendar and todo dashboard
    #[default]
    Dashboard,
    /// Full-screen photo frame
    Frame,
}

impl DisplayMode {
    /// The other mode
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dashboard => Self::Frame,
            Self::Frame => Self::Dashboard,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Frame => write!(f, "frame"),
        }
    }
}

/// Mutations the voice pipeline performs on shared application state
///
/// Implementations are expected to be synchronous with no side effects beyond
/// the state change itself.
pub trait AppState: Send {
    /// Append a todo for a person
    fn add_todo(&mut self, person: &str, text: &str);

    /// All todos in list order
    fn todos(&self) -> &[TodoItem];

    /// Mark the todo with this id complete
    fn complete_todo(&mut self, id: &str);

    /// Show the calendar overlay
    fn show_calendar(&mut self);

    /// Hide the calendar overlay
    fn hide_calendar(&mut self);

    /// Advance the slideshow
    fn next_slide(&mut self);

    /// Step the slideshow back
    fn previous_slide(&mut self);

    /// Open the todo view, optionally scoped to one person
    fn show_todos(&mut self, person: Option<&str>);

    /// Flip between dashboard and frame mode
    fn toggle_mode(&mut self);

    /// Open the settings surface
    fn open_settings(&mut self);
}

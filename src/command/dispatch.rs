//! Command dispatch
//!
//! Every command maps to exactly one state mutation and one confirmation
//! text. Unrecognised utterances are echoed back so mis-parses are visible.

use super::VoiceCommand;
use crate::state::AppState;

/// Apply a command to application state
///
/// Returns the confirmation text to show the user.
pub fn dispatch(command: &VoiceCommand, state: &mut dyn AppState) -> String {
    match command {
        VoiceCommand::AddTodo { person, text } => {
            state.add_todo(person, text);
            format!("Added \"{text}\" to {person}'s list")
        }
        VoiceCommand::ShowCalendar => {
            state.show_calendar();
            "Showing calendar".to_string()
        }
        VoiceCommand::HideCalendar => {
            state.hide_calendar();
            "Hiding calendar".to_string()
        }
        VoiceCommand::NextSlide => {
            state.next_slide();
            "Next slide".to_string()
        }
        VoiceCommand::PreviousSlide => {
            state.previous_slide();
            "Previous slide".to_string()
        }
        VoiceCommand::ShowTodos { person } => {
            state.show_todos(person.as_deref());
            person.as_ref().map_or_else(
                || "Showing all todos".to_string(),
                |p| format!("Showing {p}'s todos"),
            )
        }
        VoiceCommand::CompleteTodo { todo_text } => complete_todo(state, todo_text),
        VoiceCommand::SwitchMode => {
            state.toggle_mode();
            "Switching view mode".to_string()
        }
        VoiceCommand::OpenSettings => {
            state.open_settings();
            "Opening settings".to_string()
        }
        VoiceCommand::Unknown { raw_text } => format!("Didn't understand: \"{raw_text}\""),
    }
}

/// Complete the first incomplete todo, in list order, containing the search text
fn complete_todo(state: &mut dyn AppState, search: &str) -> String {
    let needle = search.to_lowercase();
    let found = state
        .todos()
        .iter()
        .find(|t| !t.completed && t.text.to_lowercase().contains(&needle))
        .map(|t| (t.id.clone(), t.text.clone()));

    match found {
        Some((id, text)) => {
            state.complete_todo(&id);
            format!("Completed: {text}")
        }
        None => {
            tracing::debug!(search, "no incomplete todo matched");
            format!("Couldn't find todo: {search}")
        }
    }
}

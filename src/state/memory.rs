//! In-memory application state

use super::{AppState, DisplayMode, TodoItem};
use crate::command::Person;

/// Application state held in memory
///
/// Stands in for the display app's store when the pipeline runs on its own.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    mode: DisplayMode,
    slide_count: usize,
    current_slide: usize,
    calendar_visible: bool,
    todos: Vec<TodoItem>,
    todo_list_visible: bool,
    selected_person: Option<Person>,
    settings_open: bool,
}

impl MemoryStore {
    /// Create an empty store with the given number of slides
    #[must_use]
    pub fn new(slide_count: usize) -> Self {
        Self {
            slide_count,
            ..Self::default()
        }
    }

    /// Seed the store with existing todos
    #[must_use]
    pub fn with_todos(mut self, todos: Vec<TodoItem>) -> Self {
        self.todos = todos;
        self
    }

    /// Current display mode
    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Index of the slide on screen
    #[must_use]
    pub const fn current_slide(&self) -> usize {
        self.current_slide
    }

    /// Whether the calendar overlay is showing
    #[must_use]
    pub const fn is_calendar_visible(&self) -> bool {
        self.calendar_visible
    }

    /// Whether the todo view is open
    #[must_use]
    pub const fn is_todo_list_visible(&self) -> bool {
        self.todo_list_visible
    }

    /// Person the todo view is scoped to
    #[must_use]
    pub fn selected_person(&self) -> Option<&str> {
        self.selected_person.as_deref()
    }

    /// Whether settings are open
    #[must_use]
    pub const fn is_settings_open(&self) -> bool {
        self.settings_open
    }

    /// Close the todo view
    pub fn hide_todos(&mut self) {
        self.todo_list_visible = false;
        self.selected_person = None;
    }
}

impl AppState for MemoryStore {
    fn add_todo(&mut self, person: &str, text: &str) {
        let todo = TodoItem::new(person, text);
        tracing::debug!(id = %todo.id, person, text, "todo added");
        self.todos.push(todo);
    }

    fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    fn complete_todo(&mut self, id: &str) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.completed = true;
        }
    }

    fn show_calendar(&mut self) {
        self.calendar_visible = true;
    }

    fn hide_calendar(&mut self) {
        self.calendar_visible = false;
    }

    fn next_slide(&mut self) {
        if self.slide_count == 0 {
            return;
        }
        self.current_slide = (self.current_slide + 1) % self.slide_count;
    }

    fn previous_slide(&mut self) {
        if self.slide_count == 0 {
            return;
        }
        self.current_slide = self
            .current_slide
            .checked_sub(1)
            .unwrap_or(self.slide_count - 1);
    }

    fn show_todos(&mut self, person: Option<&str>) {
        self.todo_list_visible = true;
        self.selected_person = person.map(ToString::to_string);
        self.calendar_visible = false;
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    fn open_settings(&mut self) {
        self.settings_open = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slides_wrap() {
        let mut store = MemoryStore::new(3);
        store.previous_slide();
        assert_eq!(store.current_slide(), 2);
        store.next_slide();
        assert_eq!(store.current_slide(), 0);
        store.next_slide();
        assert_eq!(store.current_slide(), 1);
    }

    #[test]
    fn test_no_slides_is_noop() {
        let mut store = MemoryStore::new(0);
        store.next_slide();
        store.previous_slide();
        assert_eq!(store.current_slide(), 0);
    }

    #[test]
    fn test_show_todos_hides_calendar() {
        let mut store = MemoryStore::new(1);
        store.show_calendar();
        store.show_todos(Some("Christy"));
        assert!(!store.is_calendar_visible());
        assert!(store.is_todo_list_visible());
        assert_eq!(store.selected_person(), Some("Christy"));

        store.hide_todos();
        assert!(!store.is_todo_list_visible());
        assert_eq!(store.selected_person(), None);
    }

    #[test]
    fn test_person_case_preserved() {
        let mut store = MemoryStore::new(0);
        store.add_todo("Chris", "Buy milk");
        assert_eq!(store.todos()[0].person, "Chris");
        assert!(!store.todos()[0].completed);
    }

    #[test]
    fn test_toggle_mode() {
        let mut store = MemoryStore::new(0);
        assert_eq!(store.mode(), DisplayMode::Dashboard);
        store.toggle_mode();
        assert_eq!(store.mode(), DisplayMode::Frame);
        store.toggle_mode();
        assert_eq!(store.mode(), DisplayMode::Dashboard);
    }
}

//! Command grammar
//!
//! A fixed, ordered list of pattern rules. Patterns overlap, so the first
//! match wins and the order below is load-bearing: person-scoped rules run
//! before their generic counterparts, and the broad completion pattern runs
//! last.

use std::sync::LazyLock;

use regex::Regex;

use super::VoiceCommand;
use crate::{Error, Result};

/// Wake phrase spellings accepted in front of a command
pub const DEFAULT_WAKE_PHRASES: &[&str] = &["hey droid", "hey android", "ok droid", "okay droid"];

/// A single-word person name
const PERSON: &str = r"([a-z][a-z0-9_-]*)";

/// Words that can sit where a person name goes but never name a person
const NOT_A_PERSON: &[&str] = &[
    "a", "all", "an", "my", "our", "that", "the", "this", "todo", "todos", "list", "lists", "your",
];

static ADD_TODO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"add\s+(.+?)\s+to\s+{PERSON}(?:'s)?\s*(?:todos|todo|list)"
    ))
    .expect("valid regex")
});

static ADD_TODO_REORDERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"add\s+to\s+{PERSON}(?:'s)?\s*(?:todos|todo|list)\s+(.+)"
    ))
    .expect("valid regex")
});

static SHOW_PERSON_TODOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:show|open|display)\s+{PERSON}(?:'s)?\s*(?:todos|todo|list)"
    ))
    .expect("valid regex")
});

static COMPLETE_TODO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:mark done|check off|complete|done|finish)\s+(.+)").expect("valid regex")
});

static DEFAULT_STRIPPER: LazyLock<WakePhrases> = LazyLock::new(WakePhrases::default);

/// Parse an utterance into a command
///
/// Total: anything the grammar does not recognise becomes
/// [`VoiceCommand::Unknown`] carrying the utterance exactly as given.
#[must_use]
pub fn parse(utterance: &str) -> VoiceCommand {
    let text = normalize(utterance);
    let text = text.as_str();

    if let Some(cmd) = match_add_todo(text) {
        return cmd;
    }

    if contains_any(text, &["show calendar", "open calendar", "calendar please"])
        || text == "calendar"
    {
        return VoiceCommand::ShowCalendar;
    }

    if contains_any(text, &["hide calendar", "close calendar", "dismiss calendar"]) {
        return VoiceCommand::HideCalendar;
    }

    if contains_any(
        text,
        &["next slide", "next image", "next photo", "next picture"],
    ) || text == "next"
    {
        return VoiceCommand::NextSlide;
    }

    if contains_any(
        text,
        &[
            "previous slide",
            "previous image",
            "previous photo",
            "previous picture",
            "last slide",
            "go back",
        ],
    ) || text == "previous"
        || text == "back"
    {
        return VoiceCommand::PreviousSlide;
    }

    if let Some(person) = SHOW_PERSON_TODOS
        .captures(text)
        .map(|caps| caps[1].to_string())
        .filter(|p| is_person(p))
    {
        return VoiceCommand::ShowTodos {
            person: Some(person),
        };
    }

    if contains_any(
        text,
        &[
            "show todos",
            "show todo",
            "show the list",
            "show lists",
            "open todos",
        ],
    ) {
        return VoiceCommand::ShowTodos { person: None };
    }

    if contains_any(
        text,
        &["switch mode", "switch view", "change mode", "toggle mode"],
    ) {
        return VoiceCommand::SwitchMode;
    }

    if contains_any(text, &["open settings", "show settings"]) || text == "settings" {
        return VoiceCommand::OpenSettings;
    }

    if let Some(caps) = COMPLETE_TODO.captures(text) {
        let todo_text = caps[1].trim();
        if !todo_text.is_empty() {
            return VoiceCommand::CompleteTodo {
                todo_text: todo_text.to_string(),
            };
        }
    }

    VoiceCommand::Unknown {
        raw_text: utterance.to_string(),
    }
}

/// Remove a leading wake phrase ("hey droid, ...") from a transcript
///
/// Transcripts without the phrase come back unchanged.
#[must_use]
pub fn strip_wake_phrase(raw: &str) -> String {
    DEFAULT_STRIPPER.strip(raw)
}

fn match_add_todo(text: &str) -> Option<VoiceCommand> {
    if let Some(caps) = ADD_TODO.captures(text) {
        let person = &caps[2];
        let todo = caps[1].trim();
        if is_person(person) && !todo.is_empty() {
            return Some(VoiceCommand::AddTodo {
                person: person.to_string(),
                text: todo.to_string(),
            });
        }
    }

    let caps = ADD_TODO_REORDERED.captures(text)?;
    let person = &caps[1];
    let todo = caps[2].trim();
    (is_person(person) && !todo.is_empty()).then(|| VoiceCommand::AddTodo {
        person: person.to_string(),
        text: todo.to_string(),
    })
}

fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase().replace('\u{2019}', "'")
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn is_person(word: &str) -> bool {
    !NOT_A_PERSON.contains(&word)
}

/// A set of wake phrases that may prefix a transcript
#[derive(Debug, Clone)]
pub struct WakePhrases {
    phrases: Vec<String>,
    prefix: Regex,
}

impl WakePhrases {
    /// Build a stripper for the given phrases
    ///
    /// Phrases are matched case-insensitively with any run of whitespace
    /// between words.
    ///
    /// # Errors
    ///
    /// Returns error if no usable phrase is given
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| {
                p.as_ref()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase()
            })
            .filter(|p| !p.is_empty())
            .collect();

        if phrases.is_empty() {
            return Err(Error::Config("at least one wake phrase required".to_string()));
        }

        let alternatives = phrases
            .iter()
            .map(|p| {
                p.split(' ')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");

        let prefix = Regex::new(&format!(r"(?i)^\s*(?:{alternatives})\b[,.!]?\s*"))
            .map_err(|e| Error::Config(format!("invalid wake phrase: {e}")))?;

        Ok(Self { phrases, prefix })
    }

    /// Remove one leading wake phrase
    #[must_use]
    pub fn strip(&self, raw: &str) -> String {
        self.prefix.find(raw).map_or_else(
            || raw.to_string(),
            |m| raw[m.end()..].trim().to_string(),
        )
    }

    /// Whether the transcript starts with a wake phrase
    #[must_use]
    pub fn is_prefixed(&self, raw: &str) -> bool {
        self.prefix.is_match(raw)
    }

    /// Normalized phrases
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for WakePhrases {
    fn default() -> Self {
        Self::new(DEFAULT_WAKE_PHRASES.iter().copied()).expect("default wake phrases are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_stopwords_fall_through() {
        assert_eq!(
            parse("show the list"),
            VoiceCommand::ShowTodos { person: None }
        );
        assert!(parse("add milk to the list").is_unknown());
    }

    #[test]
    fn test_normalizes_curly_apostrophe() {
        assert_eq!(
            parse("Add eggs to Chris\u{2019}s list"),
            VoiceCommand::AddTodo {
                person: "chris".to_string(),
                text: "eggs".to_string(),
            }
        );
    }

    #[test]
    fn test_custom_wake_phrases() {
        let phrases = WakePhrases::new(["Computer", "  hello   frame "]).unwrap();
        assert_eq!(phrases.phrases(), &["computer", "hello frame"]);
        assert_eq!(phrases.strip("computer. next slide"), "next slide");
        assert_eq!(phrases.strip("Hello  Frame! show calendar"), "show calendar");
        assert_eq!(phrases.strip("hey droid next"), "hey droid next");
    }

    #[test]
    fn test_wake_phrase_needs_word_boundary() {
        let phrases = WakePhrases::default();
        assert!(!phrases.is_prefixed("hey droids are cool"));
        assert!(phrases.is_prefixed("OK Droid, next"));
    }

    #[test]
    fn test_empty_phrase_set_rejected() {
        assert!(WakePhrases::new(["", "   "]).is_err());
    }
}

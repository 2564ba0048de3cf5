//! Quick-capture parsing.
//!
//! A capture is a single line of free text with inline shortcuts:
//!
//! - `/write`, `/read`, ... picks one of the fixed [`Category`] values
//! - `#urgent`, `#10min`, `#tomorrow`, `#weekly`, ... are looked up in a
//!   [`TagVocabulary`]; words the vocabulary does not know become plain tags
//!
//! Shortcuts are whitespace-delimited tokens whose body is made of ASCII word
//! characters. Recognised tokens are removed and the remaining words form the
//! title. Later tokens of the same kind overwrite earlier ones.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{normalize_tags, Category, Frequency, NewTaskData, Priority, TimeEstimate};
use crate::timezone::Today;

#[derive(Error, Debug, PartialEq)]
pub enum CaptureError {
    #[error("Capture has no title once shortcuts are removed")]
    EmptyTitle,

    #[error("Invalid effect '{effect}' for tag '#{tag}': {reason}")]
    InvalidTagEffect {
        tag: String,
        effect: String,
        reason: String,
    },
}

/// What a vocabulary tag does to the draft. Unset fields leave the draft alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagEffect {
    pub priority: Option<Priority>,
    pub time_estimate: Option<TimeEstimate>,
    /// Due date as an offset from today.
    pub due_in_days: Option<u64>,
    pub repeat: Option<Frequency>,
}

impl TagEffect {
    pub const fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            time_estimate: None,
            due_in_days: None,
            repeat: None,
        }
    }

    pub const fn estimate(time_estimate: TimeEstimate) -> Self {
        Self {
            priority: None,
            time_estimate: Some(time_estimate),
            due_in_days: None,
            repeat: None,
        }
    }

    pub const fn due_in(days: u64) -> Self {
        Self {
            priority: None,
            time_estimate: None,
            due_in_days: Some(days),
            repeat: None,
        }
    }

    pub const fn repeat(frequency: Frequency) -> Self {
        Self {
            priority: None,
            time_estimate: None,
            due_in_days: None,
            repeat: Some(frequency),
        }
    }
}

/// Parses the configuration form of an effect: comma-separated
/// `key:value` pairs, e.g. `"priority:medium, estimate:5-10 min"`,
/// `"due:+2"`, `"due:tomorrow"`, `"repeat:weekly"`.
impl FromStr for TagEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut effect = TagEffect::default();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once(':')
                .ok_or_else(|| format!("expected key:value, got '{}'", part))?;
            let value = value.trim();
            match key.trim().to_lowercase().as_str() {
                "priority" => {
                    effect.priority = Some(value.parse::<Priority>().map_err(|e| e.to_string())?);
                }
                "estimate" => {
                    effect.time_estimate =
                        Some(value.parse::<TimeEstimate>().map_err(|e| e.to_string())?);
                }
                "due" => {
                    let days = match value {
                        "today" => 0,
                        "tomorrow" => 1,
                        offset => offset
                            .trim_start_matches('+')
                            .parse::<u64>()
                            .map_err(|_| format!("invalid day offset '{}'", offset))?,
                    };
                    effect.due_in_days = Some(days);
                }
                "repeat" => {
                    effect.repeat = Some(value.parse::<Frequency>().map_err(|e| e.to_string())?);
                }
                other => return Err(format!("unknown key '{}'", other)),
            }
        }
        if effect == TagEffect::default() {
            return Err("effect is empty".to_string());
        }
        Ok(effect)
    }
}

/// Built-in tag table.
const CANONICAL_TAGS: &[(&str, TagEffect)] = &[
    ("high", TagEffect::priority(Priority::High)),
    ("urgent", TagEffect::priority(Priority::High)),
    ("medium", TagEffect::priority(Priority::Medium)),
    ("low", TagEffect::priority(Priority::Low)),
    ("quick", TagEffect::estimate(TimeEstimate::Quick)),
    ("2min", TagEffect::estimate(TimeEstimate::Quick)),
    ("5min", TagEffect::estimate(TimeEstimate::Quick)),
    ("fast", TagEffect::estimate(TimeEstimate::Quick)),
    ("short", TagEffect::estimate(TimeEstimate::Quick)),
    ("10min", TagEffect::estimate(TimeEstimate::Mid)),
    ("mid", TagEffect::estimate(TimeEstimate::Mid)),
    ("long", TagEffect::estimate(TimeEstimate::Long)),
    ("15min", TagEffect::estimate(TimeEstimate::Long)),
    ("30min", TagEffect::estimate(TimeEstimate::Long)),
    ("slow", TagEffect::estimate(TimeEstimate::Long)),
    ("extended", TagEffect::estimate(TimeEstimate::Long)),
    ("today", TagEffect::due_in(0)),
    ("tomorrow", TagEffect::due_in(1)),
    ("daily", TagEffect::repeat(Frequency::Daily)),
    ("weekly", TagEffect::repeat(Frequency::Weekly)),
    ("monthly", TagEffect::repeat(Frequency::Monthly)),
];

/// Tags offered while typing a `#` shortcut, in display order.
const SUGGESTED_TAGS: &[&str] = &[
    "today", "tomorrow", "urgent", "high", "medium", "low", "quick", "long", "daily", "weekly",
    "monthly", "work", "personal",
];

const MAX_SUGGESTIONS: usize = 5;

/// Lookup table from tag word to [`TagEffect`].
#[derive(Debug, Clone, PartialEq)]
pub struct TagVocabulary {
    entries: HashMap<String, TagEffect>,
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self::canonical()
    }
}

impl TagVocabulary {
    /// The built-in vocabulary. `#medium` only sets the priority.
    pub fn canonical() -> Self {
        let entries = CANONICAL_TAGS
            .iter()
            .map(|(word, effect)| (word.to_string(), *effect))
            .collect();
        Self { entries }
    }

    /// Variant where `#medium` also sets a `5-10 min` estimate.
    pub fn with_medium_estimate(mut self) -> Self {
        self.insert(
            "medium",
            TagEffect {
                priority: Some(Priority::Medium),
                time_estimate: Some(TimeEstimate::Mid),
                ..TagEffect::default()
            },
        );
        self
    }

    /// Builds the vocabulary from configuration values. `extra` maps tag words
    /// to effect strings (see [`TagEffect::from_str`]) and may override
    /// built-in words.
    pub fn from_config(
        medium_sets_estimate: bool,
        extra: &HashMap<String, String>,
    ) -> Result<Self, CaptureError> {
        let mut vocabulary = Self::canonical();
        if medium_sets_estimate {
            vocabulary = vocabulary.with_medium_estimate();
        }
        for (tag, effect) in extra {
            let parsed = effect.parse::<TagEffect>().map_err(|reason| CaptureError::InvalidTagEffect {
                tag: tag.clone(),
                effect: effect.clone(),
                reason,
            })?;
            vocabulary.insert(tag, parsed);
        }
        Ok(vocabulary)
    }

    pub fn insert(&mut self, word: &str, effect: TagEffect) {
        self.entries
            .insert(word.trim_start_matches('#').to_lowercase(), effect);
    }

    pub fn lookup(&self, word: &str) -> Option<&TagEffect> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Structured result of a capture, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub time_estimate: TimeEstimate,
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Sets the last day a recurring draft may spawn instances on.
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn into_new_task(self) -> NewTaskData {
        NewTaskData {
            title: self.title,
            category: self.category,
            tags: self.tags,
            priority: self.priority,
            time_estimate: Some(self.time_estimate),
            due_date: self.due_date,
            frequency: self.frequency.filter(|_| self.is_recurring),
            start_date: self.start_date,
            end_date: self.end_date,
            template_id: None,
        }
    }
}

enum Token<'a> {
    Category(Category),
    Tag(String),
    Text(&'a str),
}

/// The run of word characters (`[A-Za-z0-9_]`) at the start of `s`.
fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Splits one whitespace-delimited word into shortcuts and title text.
///
/// A shortcut is `/` or `#` followed by word characters, at the start of the
/// word or right after another shortcut. Anything trailing it, such as the
/// comma in `/write,`, stays title text.
fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let (is_tag, after) = match (rest.strip_prefix('#'), rest.strip_prefix('/')) {
            (Some(after), _) => (true, after),
            (None, Some(after)) => (false, after),
            (None, None) => {
                tokens.push(Token::Text(rest));
                break;
            }
        };
        let body = leading_word(after);
        if body.is_empty() {
            tokens.push(Token::Text(rest));
            break;
        }

        let shortcut_len = 1 + body.len();
        if is_tag {
            tokens.push(Token::Tag(body.to_lowercase()));
        } else if let Ok(category) = body.parse::<Category>() {
            tokens.push(Token::Category(category));
        } else {
            tokens.push(Token::Text(&rest[..shortcut_len]));
        }
        rest = &rest[shortcut_len..];
    }
    tokens
}

/// Turns capture text into a [`TaskDraft`].
#[derive(Debug, Clone, Default)]
pub struct CaptureParser {
    vocabulary: TagVocabulary,
}

impl CaptureParser {
    pub fn new(vocabulary: TagVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    /// Parses `text`, rejecting captures whose title ends up empty.
    pub fn parse(&self, text: &str, today: &Today) -> Result<TaskDraft, CaptureError> {
        let draft = self.preview(text, today);
        if draft.title.is_empty() {
            tracing::debug!(input = text, "rejected capture with empty title");
            return Err(CaptureError::EmptyTitle);
        }
        tracing::debug!(
            title = %draft.title,
            category = ?draft.category,
            recurring = draft.is_recurring,
            "parsed capture"
        );
        Ok(draft)
    }

    /// Parses `text` without rejecting an empty title, for live previews.
    pub fn preview(&self, text: &str, today: &Today) -> TaskDraft {
        let mut draft = TaskDraft {
            title: String::new(),
            category: None,
            tags: Vec::new(),
            priority: None,
            time_estimate: TimeEstimate::default(),
            due_date: None,
            is_recurring: false,
            frequency: None,
            start_date: None,
            end_date: None,
        };
        let mut words: Vec<String> = Vec::new();
        let mut plain_tags: Vec<String> = Vec::new();

        for raw in text.split_whitespace() {
            let mut word = String::new();
            for token in tokenize(raw) {
                match token {
                    Token::Category(category) => draft.category = Some(category),
                    Token::Tag(tag) => match self.vocabulary.lookup(&tag) {
                        Some(effect) => Self::apply(&mut draft, effect, today),
                        None => plain_tags.push(tag),
                    },
                    Token::Text(text) => word.push_str(text),
                }
            }
            if !word.is_empty() {
                words.push(word);
            }
        }

        draft.title = words.join(" ");
        draft.tags = normalize_tags(plain_tags);
        draft
    }

    fn apply(draft: &mut TaskDraft, effect: &TagEffect, today: &Today) {
        if let Some(priority) = effect.priority {
            draft.priority = Some(priority);
        }
        if let Some(estimate) = effect.time_estimate {
            draft.time_estimate = estimate;
        }
        if let Some(days) = effect.due_in_days {
            draft.due_date = Some(today.plus_days(days));
        }
        if let Some(frequency) = effect.repeat {
            draft.is_recurring = true;
            draft.frequency = Some(frequency);
            draft.start_date = Some(today.date());
        }
    }

    /// Completions for the shortcut being typed at the end of `input`.
    pub fn suggestions(&self, input: &str) -> Vec<String> {
        let Some(last) = input.split_whitespace().last() else {
            return Vec::new();
        };
        if input.ends_with(char::is_whitespace) {
            return Vec::new();
        }

        if let Some(partial) = last.strip_prefix('/') {
            let partial = partial.to_lowercase();
            Category::ALL
                .iter()
                .map(|c| c.as_str().to_lowercase())
                .filter(|name| name.starts_with(&partial))
                .map(|name| format!("/{}", name))
                .take(MAX_SUGGESTIONS)
                .collect()
        } else if let Some(partial) = last.strip_prefix('#') {
            let partial = partial.to_lowercase();
            SUGGESTED_TAGS
                .iter()
                .filter(|tag| tag.starts_with(&partial))
                .map(|tag| format!("#{}", tag))
                .take(MAX_SUGGESTIONS)
                .collect()
        } else {
            Vec::new()
        }
    }
}

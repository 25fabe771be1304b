use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use uuid::Uuid;

/// Read-only view of the active note and its selection.
pub trait NoteSource {
    fn content(&self) -> String;
    fn selected_text(&self) -> Option<String>;
}

/// Mutations the assistant is allowed to make to the active note.
pub trait NoteSink {
    fn insert_text(&mut self, text: &str);
    fn update_tags(&mut self, tags: &[String]);
}

/// Snapshot of the note taken when a request is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteContext {
    pub content: String,
    pub selection: Option<String>,
}

impl NoteContext {
    pub fn capture(source: &dyn NoteSource) -> Self {
        Self {
            content: source.content(),
            selection: source.selected_text().filter(|s| !s.is_empty()),
        }
    }

    /// The selection when there is one, otherwise the whole note.
    pub fn text_to_process(&self) -> &str {
        self.selection.as_deref().unwrap_or(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_bookmarked: bool,
    /// Byte range of the editor selection; a caret when empty.
    #[serde(skip)]
    pub selection: Option<Range<usize>>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            is_bookmarked: false,
            selection: None,
        }
    }

    /// Set the selection, ignoring ranges that are out of bounds or split a character.
    pub fn select(&mut self, range: Range<usize>) {
        let valid = range.start <= range.end
            && range.end <= self.content.len()
            && self.content.is_char_boundary(range.start)
            && self.content.is_char_boundary(range.end);
        self.selection = valid.then_some(range);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl NoteSource for Note {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn selected_text(&self) -> Option<String> {
        self.selection
            .as_ref()
            .filter(|range| !range.is_empty())
            .and_then(|range| self.content.get(range.clone()))
            .map(str::to_string)
    }
}

impl NoteSink for Note {
    /// Replace the selection (or insert at the caret) and leave the caret after
    /// the inserted text. Without a selection the text is appended.
    fn insert_text(&mut self, text: &str) {
        match self.selection.take() {
            Some(range) if range.end <= self.content.len() => {
                self.content.replace_range(range.clone(), text);
                let caret = range.start + text.len();
                self.selection = Some(caret..caret);
            }
            _ => {
                if !self.content.is_empty() && !self.content.ends_with('\n') {
                    self.content.push('\n');
                }
                self.content.push_str(text);
            }
        }
        self.touch();
    }

    fn update_tags(&mut self, tags: &[String]) {
        let mut changed = false;
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
                self.tags.push(tag.to_string());
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
    }
}

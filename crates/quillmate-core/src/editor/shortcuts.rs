//! Keyboard shortcuts applied directly to Markdown source and a selection.
//!
//! Offsets are byte offsets into the source text. Selections that land inside
//! a multi-byte character are moved back to its start.

use regex::Regex;
use std::sync::OnceLock;

/// Selected byte range, always ordered so `start <= end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self {
            start: anchor.min(head),
            end: anchor.max(head),
        }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_cursor(self) -> bool {
        self.start == self.end
    }

    /// Fit both ends inside `text`, moving each back onto a char boundary.
    fn snapped(self, text: &str) -> Self {
        Self::new(floor_boundary(text, self.start), floor_boundary(text, self.end))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceBuffer {
    pub text: String,
    pub selection: Selection,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.len();
        Self {
            text,
            selection: Selection::cursor(len),
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.snapped(&self.text);
    }

    pub fn selected_text(&self) -> &str {
        self.text
            .get(self.selection.start..self.selection.end)
            .unwrap_or_default()
    }

    fn replace(&mut self, start: usize, end: usize, insert: &str, selection_after: Selection) {
        self.text.replace_range(start..end, insert);
        self.set_selection(selection_after);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Bold,
    Italic,
    Underline,
    InlineCode,
    CodeBlock,
    Heading(u8),
    ClearFormat,
    SelectLine,
    DeleteLine,
    InsertTable,
}

impl Shortcut {
    /// Map a Ctrl (+Shift) key combination to a shortcut.
    pub fn from_key(ctrl: bool, shift: bool, key: Key) -> Option<Self> {
        if !ctrl {
            return None;
        }
        let shortcut = match (shift, key) {
            (false, Key::Char('b')) => Shortcut::Bold,
            (false, Key::Char('i')) => Shortcut::Italic,
            (false, Key::Char('u')) => Shortcut::Underline,
            (false, Key::Char('`')) => Shortcut::InlineCode,
            (true, Key::Char('`' | '~')) => Shortcut::CodeBlock,
            (false, Key::Char('0')) => Shortcut::ClearFormat,
            (false, Key::Char(c @ '1'..='6')) => Shortcut::Heading(c as u8 - b'0'),
            (false, Key::Char('l')) => Shortcut::SelectLine,
            (true, Key::Char('k' | 'K')) => Shortcut::DeleteLine,
            (false, Key::Enter) => Shortcut::InsertTable,
            _ => return None,
        };
        Some(shortcut)
    }
}

const TABLE_TEMPLATE: &str =
    "| Header 1 | Header 2 | Header 3 |\n| --- | --- | --- |\n| Cell | Cell | Cell |\n";
const TABLE_FIRST_CELL: &str = "Header 1";

/// Apply a shortcut. Returns whether the text or selection changed.
pub fn apply_shortcut(buffer: &mut SourceBuffer, shortcut: Shortcut) -> bool {
    let before = buffer.clone();
    buffer.set_selection(buffer.selection);

    match shortcut {
        Shortcut::Bold => wrap(buffer, "**", "**", "bold text"),
        Shortcut::Italic => wrap(buffer, "*", "*", "italic text"),
        Shortcut::Underline => wrap(buffer, "<u>", "</u>", "underlined text"),
        Shortcut::InlineCode => wrap(buffer, "`", "`", "code"),
        Shortcut::CodeBlock => code_block(buffer),
        Shortcut::Heading(level) => heading(buffer, level.clamp(1, 6)),
        Shortcut::ClearFormat => clear_format(buffer),
        Shortcut::SelectLine => {
            let start = line_start(&buffer.text, buffer.selection.start);
            let end = line_end(&buffer.text, buffer.selection.end);
            buffer.set_selection(Selection::new(start, end));
        }
        Shortcut::DeleteLine => delete_line(buffer),
        Shortcut::InsertTable => insert_table(buffer),
    }

    *buffer != before
}

fn wrap(buffer: &mut SourceBuffer, open: &str, close: &str, placeholder: &str) {
    let Selection { start, end } = buffer.selection;
    if start == end {
        let insert = format!("{open}{placeholder}{close}");
        let placeholder_start = start + open.len();
        buffer.replace(
            start,
            end,
            &insert,
            Selection::new(placeholder_start, placeholder_start + placeholder.len()),
        );
    } else {
        let insert = format!("{open}{}{close}", &buffer.text[start..end]);
        let caret = start + insert.len();
        buffer.replace(start, end, &insert, Selection::cursor(caret));
    }
}

fn code_block(buffer: &mut SourceBuffer) {
    let start = buffer.selection.start;
    let lead = if start == line_start(&buffer.text, start) {
        ""
    } else {
        "\n"
    };
    wrap(buffer, &format!("{lead}```\n"), "\n```", "code");
}

fn heading_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,6}\s+").unwrap())
}

fn heading(buffer: &mut SourceBuffer, level: u8) {
    let selection = buffer.selection;
    let ls = line_start(&buffer.text, selection.start);
    let le = line_end(&buffer.text, selection.start);
    let line = &buffer.text[ls..le];

    let existing = heading_prefix_re()
        .find(line)
        .map(|m| m.end())
        .unwrap_or(0);
    let body = line[existing..].to_string();
    let prefix = format!("{} ", "#".repeat(level as usize));

    if body.is_empty() {
        let placeholder = "Heading";
        let insert = format!("{prefix}{placeholder}");
        let start = ls + prefix.len();
        buffer.replace(
            ls,
            le,
            &insert,
            Selection::new(start, start + placeholder.len()),
        );
        return;
    }

    let shift = |pos: usize| {
        if pos <= ls + existing {
            ls + prefix.len()
        } else {
            pos - existing + prefix.len()
        }
    };
    let after = Selection::new(shift(selection.start), shift(selection.end.min(le)));
    buffer.replace(ls, le, &format!("{prefix}{body}"), after);
}

fn format_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*|~~|</?u>|[*`]").unwrap())
}

fn clear_format(buffer: &mut SourceBuffer) {
    let selection = buffer.selection;
    let (start, end) = if selection.is_cursor() {
        (
            line_start(&buffer.text, selection.start),
            line_end(&buffer.text, selection.start),
        )
    } else {
        (selection.start, selection.end)
    };

    let original = &buffer.text[start..end];
    let mut cleaned = format_marker_re().replace_all(original, "").into_owned();
    if let Some(m) = heading_prefix_re().find(&cleaned) {
        cleaned.replace_range(..m.end(), "");
    }
    if cleaned == original {
        return;
    }
    let after = Selection::new(start, start + cleaned.len());
    buffer.replace(start, end, &cleaned, after);
}

fn delete_line(buffer: &mut SourceBuffer) {
    let text = &buffer.text;
    let start = line_start(text, buffer.selection.start);
    let end = line_end(text, buffer.selection.end);

    let (from, to) = if end < text.len() {
        (start, end + 1)
    } else if start > 0 {
        (start - 1, end)
    } else {
        (start, end)
    };
    let caret = if end < text.len() { from } else { line_start(text, from) };
    buffer.replace(from, to, "", Selection::cursor(caret));
}

fn insert_table(buffer: &mut SourceBuffer) {
    let Selection { start, end } = buffer.selection;
    let lead = if start == line_start(&buffer.text, start) {
        ""
    } else {
        "\n"
    };
    let insert = format!("{lead}{TABLE_TEMPLATE}");
    let cell = start + lead.len() + 2;
    buffer.replace(
        start,
        end,
        &insert,
        Selection::new(cell, cell + TABLE_FIRST_CELL.len()),
    );
}

fn floor_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn line_start(text: &str, pos: usize) -> usize {
    let pos = floor_boundary(text, pos);
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, pos: usize) -> usize {
    let pos = floor_boundary(text, pos);
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

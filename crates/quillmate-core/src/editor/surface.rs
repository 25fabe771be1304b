//! A small structured text buffer standing in for the editor's rendering surface.
//!
//! The live Markdown transformer only talks to [`EditableSurface`];
//! [`RichDocument`] is the in-memory implementation used by shells without a
//! DOM and by the tests.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineKind {
    Bold,
    Italic,
    Code,
    Underline,
}

impl InlineKind {
    fn markers(&self) -> (&'static str, &'static str) {
        match self {
            InlineKind::Bold => ("**", "**"),
            InlineKind::Italic => ("*", "*"),
            InlineKind::Code => ("`", "`"),
            InlineKind::Underline => ("<u>", "</u>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Styled { kind: InlineKind, text: String },
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(text) | Inline::Styled { text, .. } => text,
        }
    }

    fn text_mut(&mut self) -> &mut String {
        match self {
            Inline::Text(text) | Inline::Styled { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub inlines: Vec<Inline>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            inlines: vec![Inline::Text(text.into())],
        }
    }

    pub fn text(&self) -> String {
        self.inlines.iter().map(Inline::text).collect()
    }
}

/// Caret position: a node inside a block and a character offset inside that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    pub block: usize,
    pub node: usize,
    pub offset: usize,
}

/// What the live transformer needs from an editing surface.
pub trait EditableSurface {
    /// Text of the node holding the caret.
    fn current_line(&self) -> Option<String>;
    /// Caret offset, in characters, within [`EditableSurface::current_line`].
    fn caret_offset(&self) -> usize;
    fn current_block_kind(&self) -> Option<BlockKind>;
    /// Turn the caret's block into a heading whose caret node holds `text`.
    /// Returns the position at the end of `text`.
    fn replace_with_heading(&mut self, level: u8, text: &str) -> Caret;
    /// Replace the caret node with `before`, `element`, `after`.
    /// Returns the position immediately after `element`.
    fn replace_with_inline(&mut self, before: &str, element: Inline, after: &str) -> Caret;
    fn set_caret(&mut self, caret: Caret);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichDocument {
    pub blocks: Vec<Block>,
    pub caret: Caret,
}

impl Default for RichDocument {
    fn default() -> Self {
        Self {
            blocks: vec![Block::paragraph("")],
            caret: Caret::default(),
        }
    }
}

impl RichDocument {
    /// One paragraph per line, caret at the end of the last line.
    pub fn from_text(text: &str) -> Self {
        let blocks: Vec<Block> = text.split('\n').map(Block::paragraph).collect();
        let last = blocks.len() - 1;
        let offset = blocks[last].text().chars().count();
        Self {
            blocks,
            caret: Caret {
                block: last,
                node: 0,
                offset,
            },
        }
    }

    /// Type text at the caret without any transformation.
    pub fn insert_str(&mut self, s: &str) {
        let caret = self.caret;
        let Some(node) = self
            .blocks
            .get_mut(caret.block)
            .and_then(|b| b.inlines.get_mut(caret.node))
        else {
            return;
        };
        let text = node.text_mut();
        let byte = char_to_byte_index(text, caret.offset);
        text.insert_str(byte, s);
        self.caret.offset += s.chars().count();
    }

    /// Visible text, blocks joined by newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize back to Markdown source for the note store.
    pub fn to_markdown(&self) -> String {
        self.blocks
            .iter()
            .map(|block| {
                let mut line = match block.kind {
                    BlockKind::Paragraph => String::new(),
                    BlockKind::Heading(level) => format!("{} ", "#".repeat(level as usize)),
                };
                for inline in &block.inlines {
                    match inline {
                        Inline::Text(text) => line.push_str(text),
                        Inline::Styled { kind, text } => {
                            let (open, close) = kind.markers();
                            line.push_str(open);
                            line.push_str(text);
                            line.push_str(close);
                        }
                    }
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn caret_node(&self) -> Option<&Inline> {
        self.blocks
            .get(self.caret.block)
            .and_then(|b| b.inlines.get(self.caret.node))
    }
}

impl EditableSurface for RichDocument {
    fn current_line(&self) -> Option<String> {
        self.caret_node().map(|node| node.text().to_string())
    }

    fn caret_offset(&self) -> usize {
        self.caret.offset
    }

    fn current_block_kind(&self) -> Option<BlockKind> {
        self.blocks.get(self.caret.block).map(|b| b.kind)
    }

    fn replace_with_heading(&mut self, level: u8, text: &str) -> Caret {
        let Caret { block, node, .. } = self.caret;
        if let Some(target) = self.blocks.get_mut(block) {
            target.kind = BlockKind::Heading(level);
            match target.inlines.get_mut(node) {
                Some(inline) => *inline = Inline::Text(text.to_string()),
                None => target.inlines = vec![Inline::Text(text.to_string())],
            }
        }
        Caret {
            block,
            node: node.min(self.blocks.get(block).map_or(0, |b| b.inlines.len().saturating_sub(1))),
            offset: text.chars().count(),
        }
    }

    fn replace_with_inline(&mut self, before: &str, element: Inline, after: &str) -> Caret {
        let Caret { block, node, .. } = self.caret;
        let Some(target) = self.blocks.get_mut(block) else {
            return self.caret;
        };
        let node = node.min(target.inlines.len());

        let mut replacement = Vec::with_capacity(3);
        if !before.is_empty() {
            replacement.push(Inline::Text(before.to_string()));
        }
        let element_index = node + replacement.len();
        replacement.push(element);
        // Always keep a text node after the element so the caret has somewhere to live.
        replacement.push(Inline::Text(after.to_string()));

        let end = (node + 1).min(target.inlines.len());
        target.inlines.splice(node..end, replacement);

        Caret {
            block,
            node: element_index + 1,
            offset: 0,
        }
    }

    fn set_caret(&mut self, caret: Caret) {
        self.caret = caret;
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub(crate) fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_puts_caret_at_end() {
        let doc = RichDocument::from_text("one\ntwö");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.caret, Caret { block: 1, node: 0, offset: 3 });
        assert_eq!(doc.current_line().as_deref(), Some("twö"));
    }

    #[test]
    fn inline_replacement_keeps_surrounding_text() {
        let mut doc = RichDocument::from_text("a **b** c");
        let caret = doc.replace_with_inline(
            "a ",
            Inline::Styled {
                kind: InlineKind::Bold,
                text: "b".to_string(),
            },
            " c",
        );
        assert_eq!(caret, Caret { block: 0, node: 2, offset: 0 });
        assert_eq!(doc.plain_text(), "a b c");
        assert_eq!(doc.to_markdown(), "a **b** c");
    }

    #[test]
    fn markdown_output_includes_heading_prefix() {
        let mut doc = RichDocument::from_text("## Title");
        doc.replace_with_heading(2, "Title");
        assert_eq!(doc.plain_text(), "Title");
        assert_eq!(doc.to_markdown(), "## Title");
    }

    #[test]
    fn insert_str_respects_multibyte_characters() {
        let mut doc = RichDocument::from_text("né");
        doc.set_caret(Caret { block: 0, node: 0, offset: 1 });
        doc.insert_str("ai");
        assert_eq!(doc.plain_text(), "naié");
        assert_eq!(doc.caret.offset, 3);
    }
}

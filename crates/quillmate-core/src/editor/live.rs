use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::trace;

use super::surface::{char_to_byte_index, BlockKind, EditableSurface, Inline, InlineKind};

/// A Markdown construct found in the caret's line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Heading { level: u8, text: String },
    Inline {
        kind: InlineKind,
        /// Byte range of the whole span, markers included.
        span: Range<usize>,
        inner: String,
    },
}

/// What a keystroke turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Heading(u8),
    Inline(InlineKind),
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap())
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap())
}

// `regex` has no lookaround, so the neighbouring characters are matched
// explicitly and trimmed off the span afterwards.
fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[^*])\*([^*]+)\*([^*]|$)").unwrap())
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+?)`").unwrap())
}

/// Find the first construct in `line`, checking heading, bold, italic, then inline code.
pub fn detect(line: &str) -> Option<Detection> {
    if let Some(cap) = heading_re().captures(line) {
        return Some(Detection::Heading {
            level: cap[1].len() as u8,
            text: cap[2].to_string(),
        });
    }

    if let Some(cap) = bold_re().captures(line) {
        return cap.get(0).map(|whole| Detection::Inline {
            kind: InlineKind::Bold,
            span: whole.range(),
            inner: cap[1].to_string(),
        });
    }

    if let Some(cap) = italic_re().captures(line) {
        let (Some(lead), Some(inner), Some(trail)) = (cap.get(1), cap.get(2), cap.get(3)) else {
            return None;
        };
        return Some(Detection::Inline {
            kind: InlineKind::Italic,
            span: lead.end()..trail.start(),
            inner: inner.as_str().to_string(),
        });
    }

    if let Some(cap) = code_re().captures(line) {
        return cap.get(0).map(|whole| Detection::Inline {
            kind: InlineKind::Code,
            span: whole.range(),
            inner: cap[1].to_string(),
        });
    }

    None
}

/// Rewrites the caret's line into rich nodes as the user types Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownLiveTransformer;

impl MarkdownLiveTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Run after each input event. At most one construct is transformed per call;
    /// malformed markup is left alone.
    ///
    /// Only the highest-priority match is considered. When that match is an
    /// inline span still ahead of the caret, nothing is transformed, even if a
    /// lower-priority span behind the caret is complete: with `` `x` **y** `` and
    /// the caret after the closing backtick, the code span waits until the bold
    /// span has been rendered.
    pub fn on_input<S: EditableSurface + ?Sized>(&self, surface: &mut S) -> Option<Applied> {
        let line = surface.current_line()?;
        let caret = char_to_byte_index(&line, surface.caret_offset());

        match detect(&line)? {
            Detection::Heading { level, text } => {
                if surface.current_block_kind() == Some(BlockKind::Heading(level)) {
                    return None;
                }
                let after = surface.replace_with_heading(level, &text);
                surface.set_caret(after);
                trace!(level, "heading applied");
                Some(Applied::Heading(level))
            }
            Detection::Inline { kind, span, inner } => {
                // Only render spans the user has already closed.
                if span.end > caret {
                    return None;
                }
                let after = surface.replace_with_inline(
                    &line[..span.start],
                    Inline::Styled { kind, text: inner },
                    &line[span.end..],
                );
                surface.set_caret(after);
                trace!(?kind, "inline style applied");
                Some(Applied::Inline(kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::surface::{Caret, RichDocument};

    #[test]
    fn detects_heading_levels() {
        assert_eq!(
            detect("### Notes"),
            Some(Detection::Heading {
                level: 3,
                text: "Notes".to_string()
            })
        );
        assert_eq!(detect("####### too deep"), None);
        assert_eq!(detect("#no space"), None);
    }

    #[test]
    fn bold_wins_over_italic() {
        match detect("**bold** and *italic*") {
            Some(Detection::Inline { kind, span, inner }) => {
                assert_eq!(kind, InlineKind::Bold);
                assert_eq!(span, 0..8);
                assert_eq!(inner, "bold");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn italic_never_matches_inside_bold_markers() {
        assert!(!matches!(
            detect("**"),
            Some(Detection::Inline { kind: InlineKind::Italic, .. })
        ));
        match detect("say *hi* now") {
            Some(Detection::Inline { kind, span, inner }) => {
                assert_eq!(kind, InlineKind::Italic);
                assert_eq!(span, 4..8);
                assert_eq!(inner, "hi");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unmatched_markers_are_plain_text() {
        assert_eq!(detect("a single * star"), None);
        assert_eq!(detect("`open code"), None);
        assert_eq!(detect("****"), None);
    }

    #[test]
    fn heading_line_becomes_heading_with_caret_at_end() {
        let mut doc = RichDocument::from_text("## Hello");
        let applied = MarkdownLiveTransformer::new().on_input(&mut doc);

        assert_eq!(applied, Some(Applied::Heading(2)));
        assert_eq!(doc.blocks[0].kind, BlockKind::Heading(2));
        assert_eq!(doc.blocks[0].text(), "Hello");
        assert_eq!(doc.caret, Caret { block: 0, node: 0, offset: 5 });
    }

    #[test]
    fn heading_is_not_reapplied_at_same_level() {
        let mut doc = RichDocument::from_text("## Hello");
        let transformer = MarkdownLiveTransformer::new();
        transformer.on_input(&mut doc);

        doc.blocks[0].inlines[0] = Inline::Text("## Again".to_string());
        assert_eq!(transformer.on_input(&mut doc), None);
        assert_eq!(doc.blocks[0].text(), "## Again");
    }

    #[test]
    fn inline_code_round_trips_without_markers() {
        let mut doc = RichDocument::from_text("`code`");
        let applied = MarkdownLiveTransformer::new().on_input(&mut doc);

        assert_eq!(applied, Some(Applied::Inline(InlineKind::Code)));
        assert_eq!(
            doc.blocks[0].inlines[0],
            Inline::Styled {
                kind: InlineKind::Code,
                text: "code".to_string()
            }
        );
        assert_eq!(doc.caret, Caret { block: 0, node: 1, offset: 0 });
    }

    #[test]
    fn bold_is_transformed_first_then_italic_on_next_pass() {
        let mut doc = RichDocument::from_text("**bold** and *italic*");
        let transformer = MarkdownLiveTransformer::new();

        assert_eq!(
            transformer.on_input(&mut doc),
            Some(Applied::Inline(InlineKind::Bold))
        );
        assert_eq!(doc.current_line().as_deref(), Some(" and *italic*"));

        // Caret sits at the start of the trailing text; move it to the end as typing would.
        doc.caret.offset = " and *italic*".chars().count();
        assert_eq!(
            transformer.on_input(&mut doc),
            Some(Applied::Inline(InlineKind::Italic))
        );
        assert_eq!(doc.plain_text(), "bold and italic");
        assert_eq!(doc.to_markdown(), "**bold** and *italic*");
    }

    #[test]
    fn typing_live_renders_spans_as_they_close() {
        let mut doc = RichDocument::default();
        let transformer = MarkdownLiveTransformer::new();
        for ch in "see `x` then more".chars() {
            doc.insert_str(&ch.to_string());
            transformer.on_input(&mut doc);
        }
        assert_eq!(doc.plain_text(), "see x then more");
        assert_eq!(doc.to_markdown(), "see `x` then more");
    }

    #[test]
    fn spans_ahead_of_the_caret_are_left_alone() {
        let mut doc = RichDocument::from_text("**later**");
        doc.set_caret(Caret { block: 0, node: 0, offset: 0 });
        assert_eq!(MarkdownLiveTransformer::new().on_input(&mut doc), None);
    }

    #[test]
    fn open_higher_priority_span_holds_back_lower_ones() {
        let mut doc = RichDocument::from_text("`x` **y**");
        let transformer = MarkdownLiveTransformer::new();

        doc.set_caret(Caret { block: 0, node: 0, offset: 3 });
        assert_eq!(transformer.on_input(&mut doc), None);
        assert_eq!(doc.to_markdown(), "`x` **y**");

        doc.set_caret(Caret { block: 0, node: 0, offset: 9 });
        assert_eq!(
            transformer.on_input(&mut doc),
            Some(Applied::Inline(InlineKind::Bold))
        );
        assert_eq!(doc.to_markdown(), "`x` **y**");
        assert_eq!(doc.plain_text(), "`x` y");
    }
}

pub mod live;
pub mod shortcuts;
pub mod surface;

pub use live::{detect, Applied, Detection, MarkdownLiveTransformer};
pub use shortcuts::{apply_shortcut, Key, Selection, Shortcut, SourceBuffer};
pub use surface::{Block, BlockKind, Caret, EditableSurface, Inline, InlineKind, RichDocument};

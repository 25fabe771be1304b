pub mod ai;
pub mod command;
pub mod config;
pub mod editor;
pub mod note;
pub mod provider;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{AiGateway, AiResponse, ChatBackend, GatewayError, Language};
pub use command::{CommandRouter, ParsedCommand, COMMANDS};
pub use config::{AiSettings, Config};
pub use editor::{MarkdownLiveTransformer, RichDocument};
pub use note::{Note, NoteSink, NoteSource};
pub use provider::Provider;
pub use session::{ChatSession, FunctionMode, PendingDraft, SessionState};
pub use state::{ChatMessage, ChatRole};

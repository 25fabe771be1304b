//! The assistant sidebar's conversation state.
//!
//! A session owns the message log and the single pending-draft slot. Network
//! work happens outside of it: [`ChatSession::submit`] and
//! [`ChatSession::quick_generate`] hand back a [`Dispatch`] the caller runs
//! (inline or on a spawned task), and the resulting [`Completion`] is fed to
//! [`ChatSession::complete`]. Completions are appended to whatever the log
//! holds when they arrive, so overlapping requests never overwrite each other.

use std::time::Duration;
use tracing::{debug, info};

use crate::ai::{
    AiGateway, OptimizeStyle, SummarizeOptions, TranslateOptions, DEFAULT_SUMMARY_LENGTH,
    DEFAULT_TAG_COUNT, DEFAULT_TARGET_LANGUAGE,
};
use crate::command::{reply_message, tags_summary, AiReply, AiRequest, CommandRouter, ParsedCommand, Routed};
use crate::note::{NoteContext, NoteSink, NoteSource};
use crate::state::{ChatMessage, ChatRole};

/// After this long the loading label switches to a "still working" notice.
pub const SLOW_REQUEST_NOTICE: Duration = Duration::from_secs(5);

const WELCOME: &str = "👋 Welcome to the AI assistant!\n\n\
You can use these commands:\n\
• /help - list all commands\n\
• /summarize - summarize the note\n\
• /translate - translate text\n\
• /explain <concept> - explain a concept\n\
• /qa <question> - ask about the note\n\n\
Or just chat with me!";

const CLEARED: &str = "🧹 Chat history cleared";

const CONTINUE_INSTRUCTION: &str = "Continue writing from the current content, keeping the same style and a natural flow. \
Reply with the continuation only, without extra explanation.";

const REWRITE_INSTRUCTION: &str = "Rewrite the content to make it clearer, smoother and more professional. \
Keep the original meaning but improve the wording. Reply with the rewritten content only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionMode {
    #[default]
    Chat,
    Summarize,
    Translate,
    Explain,
    Qa,
    Optimize,
    Tags,
    Continue,
    Rewrite,
}

impl FunctionMode {
    pub fn all() -> Vec<FunctionMode> {
        vec![
            FunctionMode::Chat,
            FunctionMode::Summarize,
            FunctionMode::Translate,
            FunctionMode::Explain,
            FunctionMode::Qa,
            FunctionMode::Optimize,
            FunctionMode::Tags,
            FunctionMode::Continue,
            FunctionMode::Rewrite,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionMode::Chat => "chat",
            FunctionMode::Summarize => "summarize",
            FunctionMode::Translate => "translate",
            FunctionMode::Explain => "explain",
            FunctionMode::Qa => "qa",
            FunctionMode::Optimize => "optimize",
            FunctionMode::Tags => "tags",
            FunctionMode::Continue => "continue",
            FunctionMode::Rewrite => "rewrite",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FunctionMode::Chat => "💬 Chat",
            FunctionMode::Summarize => "📝 Summarize",
            FunctionMode::Translate => "🌐 Translate",
            FunctionMode::Explain => "🎓 Explain",
            FunctionMode::Qa => "❓ Q&A",
            FunctionMode::Optimize => "✨ Optimize",
            FunctionMode::Tags => "🏷️ Generate tags",
            FunctionMode::Continue => "✍️ Continue writing",
            FunctionMode::Rewrite => "🔄 Rewrite",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FunctionMode::Chat => "Type a message or a command (e.g. /help)...",
            FunctionMode::Summarize => "Summary length, e.g. 150 (default 200)...",
            FunctionMode::Translate => "Target language, e.g. Japanese (default English)...",
            FunctionMode::Explain => "Concept or term to explain...",
            FunctionMode::Qa => "Ask a question about the note...",
            FunctionMode::Optimize => "Style: formal, casual, academic, creative...",
            FunctionMode::Tags => "Press send to generate tags (no input needed)...",
            FunctionMode::Continue => "Optional direction for the continuation...",
            FunctionMode::Rewrite => "Optional rewrite requirements...",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FunctionMode::Chat => "Tip: start with / for a command, or just chat",
            FunctionMode::Summarize => "Summarizes the note or the selected text",
            FunctionMode::Translate => "Translates the note or the selected text",
            FunctionMode::Explain => "Explains a concept using the note as context",
            FunctionMode::Qa => "Answers your question from the note's content",
            FunctionMode::Optimize => "Polishes the wording of the note or selection",
            FunctionMode::Tags => "Generates tags from the note's content",
            FunctionMode::Continue => "Continues the note in the same style",
            FunctionMode::Rewrite => "Rewrites the content to be clearer and more professional",
        }
    }

    /// Wrap free-form input into the equivalent slash command.
    /// `Err` carries the message for input this mode cannot accept.
    fn command_line(&self, input: &str) -> Result<Option<String>, &'static str> {
        let with_arg = |name: &str| {
            if input.is_empty() {
                name.to_string()
            } else {
                format!("{name} {input}")
            }
        };
        match self {
            FunctionMode::Summarize => Ok(Some(with_arg("/summarize"))),
            FunctionMode::Translate => Ok(Some(with_arg("/translate"))),
            FunctionMode::Optimize => Ok(Some(with_arg("/optimize"))),
            FunctionMode::Tags => Ok(Some("/tags".to_string())),
            FunctionMode::Explain if input.is_empty() => {
                Err("❌ Please enter a concept or term to explain")
            }
            FunctionMode::Explain => Ok(Some(with_arg("/explain"))),
            FunctionMode::Qa if input.is_empty() => Err("❌ Please enter your question"),
            FunctionMode::Qa => Ok(Some(with_arg("/qa"))),
            FunctionMode::Chat | FunctionMode::Continue | FunctionMode::Rewrite => Ok(None),
        }
    }

    fn writing_instruction(&self, hint: &str) -> Option<String> {
        let base = match self {
            FunctionMode::Continue => CONTINUE_INSTRUCTION,
            FunctionMode::Rewrite => REWRITE_INSTRUCTION,
            _ => return None,
        };
        if hint.is_empty() {
            Some(base.to_string())
        } else {
            Some(format!("{base}\n\nAdditional guidance: {hint}"))
        }
    }
}

/// AI output waiting for the user to accept or reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDraft {
    pub text: String,
    pub source: FunctionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
    PreviewPending,
}

/// Where a request came from, which decides how its result is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Typed input: the result is appended to the log.
    Chat { command: Option<ParsedCommand> },
    /// Quick generate: a successful result is staged as a draft.
    QuickGenerate(FunctionMode),
}

/// An AI request the session is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub request: AiRequest,
    pub origin: Origin,
    /// Log generation the request was sent from; bumped by [`ChatSession::clear`].
    epoch: u64,
}

impl Dispatch {
    pub async fn run(self, gateway: &AiGateway) -> Completion {
        let reply = self.request.run(gateway).await;
        Completion {
            reply,
            origin: self.origin,
            epoch: self.epoch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub reply: AiReply,
    pub origin: Origin,
    epoch: u64,
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    mode: FunctionMode,
    draft: Option<PendingDraft>,
    in_flight: usize,
    epoch: u64,
    router: CommandRouter,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::system(WELCOME)],
            mode: FunctionMode::Chat,
            draft: None,
            in_flight: 0,
            epoch: 0,
            router: CommandRouter::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn mode(&self) -> FunctionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FunctionMode) {
        debug!(mode = mode.as_str(), "function mode selected");
        self.mode = mode;
    }

    pub fn draft(&self) -> Option<&PendingDraft> {
        self.draft.as_ref()
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight > 0 {
            SessionState::AwaitingResponse
        } else if self.draft.is_some() {
            SessionState::PreviewPending
        } else {
            SessionState::Idle
        }
    }

    /// Whether the input box should be enabled. Advisory only: `submit` does not enforce it.
    pub fn accepts_input(&self) -> bool {
        self.in_flight == 0
    }

    pub fn loading_label(&self, elapsed: Duration) -> String {
        if elapsed >= SLOW_REQUEST_NOTICE {
            return "⏳ Still working on it, please wait...".to_string();
        }
        match self.mode {
            FunctionMode::Chat => "🤔 AI is thinking...".to_string(),
            mode => format!("🤖 Generating: {}...", mode.title()),
        }
    }

    /// Handle text from the input box according to the current function mode.
    pub fn submit(&mut self, input: &str, source: &dyn NoteSource) -> Option<Dispatch> {
        let input = input.trim();
        let note = NoteContext::capture(source);

        if self.mode == FunctionMode::Chat {
            if input.is_empty() {
                return None;
            }
            self.push(ChatMessage::user(input));
            return match CommandRouter::parse(input) {
                Some(command) => self.route(command, &note),
                None => self.dispatch(
                    AiRequest::Ask {
                        question: input.to_string(),
                        context: note.content,
                    },
                    Origin::Chat { command: None },
                ),
            };
        }

        let line = match self.mode.command_line(input) {
            Ok(line) => line,
            Err(message) => {
                self.push(ChatMessage::system(message).flagged_error(true));
                return None;
            }
        };

        let title = self.mode.title();
        self.push(ChatMessage::user(if input.is_empty() {
            title.to_string()
        } else {
            format!("{title}: {input}")
        }));

        match line.as_deref().and_then(CommandRouter::parse) {
            Some(command) => self.route(command, &note),
            None => {
                let question = self.mode.writing_instruction(input)?;
                self.dispatch(
                    AiRequest::Ask {
                        question,
                        context: note.text_to_process().to_string(),
                    },
                    Origin::Chat { command: None },
                )
            }
        }
    }

    /// One-click generation for the selected function mode. Typed input is
    /// only used as a steering hint (continue/rewrite) or as the required
    /// concept/question (explain/qa).
    pub fn quick_generate(&mut self, hint: &str, source: &dyn NoteSource) -> Option<Dispatch> {
        let mode = self.mode;
        if mode == FunctionMode::Chat {
            return None;
        }
        if self.draft.is_some() {
            self.push(ChatMessage::system(
                "⚠️ A generated draft is still waiting for review. Accept or reject it first.",
            ));
            return None;
        }

        let hint = hint.trim();
        let note = NoteContext::capture(source);
        let text = note.text_to_process().to_string();

        let request = match mode {
            FunctionMode::Summarize => AiRequest::Summarize {
                text,
                options: SummarizeOptions {
                    max_length: DEFAULT_SUMMARY_LENGTH,
                    language: None,
                },
            },
            FunctionMode::Translate => AiRequest::Translate {
                text,
                options: TranslateOptions::to(DEFAULT_TARGET_LANGUAGE),
            },
            FunctionMode::Optimize => AiRequest::Optimize {
                text,
                style: OptimizeStyle::Formal,
            },
            FunctionMode::Tags => AiRequest::Tags {
                text,
                max_tags: DEFAULT_TAG_COUNT,
            },
            FunctionMode::Explain | FunctionMode::Qa => {
                if let Err(message) = mode.command_line(hint) {
                    self.push(ChatMessage::system(message).flagged_error(true));
                    return None;
                }
                if mode == FunctionMode::Explain {
                    AiRequest::Explain {
                        concept: hint.to_string(),
                        context: text,
                        options: Default::default(),
                    }
                } else {
                    AiRequest::Ask {
                        question: hint.to_string(),
                        context: text,
                    }
                }
            }
            FunctionMode::Continue | FunctionMode::Rewrite => AiRequest::Ask {
                question: mode.writing_instruction(hint)?,
                context: text,
            },
            FunctionMode::Chat => return None,
        };

        self.push(ChatMessage::system(format!("🤖 Generating: {}...", mode.title())));
        self.dispatch(request, Origin::QuickGenerate(mode))
    }

    /// Apply a finished request to the current log.
    pub fn complete(&mut self, completion: Completion, sink: &mut dyn NoteSink) {
        // Requests sent before a clear were already written off by it.
        if completion.epoch == self.epoch {
            self.in_flight = self.in_flight.saturating_sub(1);
        } else {
            debug!(epoch = completion.epoch, current = self.epoch, "completion from before clear");
        }

        match completion.origin {
            Origin::Chat { command } => {
                let message = reply_message(command.as_ref(), completion.reply, sink);
                self.push(message);
            }
            Origin::QuickGenerate(mode) => match completion.reply {
                AiReply::Tags(Ok(tags)) => {
                    sink.update_tags(&tags);
                    self.push(ChatMessage::ai(tags_summary(&tags)));
                }
                AiReply::Tags(Err(error)) => {
                    self.push(ChatMessage::ai(format!("❌ {error}")).flagged_error(true));
                }
                AiReply::Text(response) => match response.error {
                    Some(error) => {
                        self.push(ChatMessage::ai(format!("❌ {error}")).flagged_error(true));
                    }
                    None if self.draft.is_some() => {
                        // Never overwrite the draft under review; keep the newer text in the log.
                        debug!(mode = mode.as_str(), "draft already pending, appending result instead");
                        self.push(ChatMessage::ai(response.content));
                    }
                    None => {
                        info!(mode = mode.as_str(), chars = response.content.len(), "draft staged for review");
                        self.draft = Some(PendingDraft {
                            text: response.content,
                            source: mode,
                        });
                    }
                },
            },
        }
    }

    /// Insert the pending draft into the note. Returns false when there is none.
    pub fn accept(&mut self, sink: &mut dyn NoteSink) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        sink.insert_text(&draft.text);
        self.push(ChatMessage::system("✅ Content inserted into the note"));
        info!(mode = draft.source.as_str(), "draft accepted");
        true
    }

    /// Discard the pending draft. Returns false when there is none.
    pub fn reject(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        self.push(ChatMessage::system("❌ Generated content rejected"));
        info!(mode = draft.source.as_str(), "draft rejected");
        true
    }

    /// Reset the log to a single notice. Requests already sent still complete
    /// and are appended to the fresh log, but they no longer hold the input gate.
    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::system(CLEARED)];
        self.draft = None;
        self.in_flight = 0;
        self.epoch += 1;
        debug!(epoch = self.epoch, "chat history cleared");
    }

    /// Insert the text of an ai message into the note.
    pub fn insert_message_into_note(&mut self, id: &str, sink: &mut dyn NoteSink) -> bool {
        let Some(text) = self
            .messages
            .iter()
            .find(|m| m.id == id && m.role == ChatRole::Ai && !m.is_error)
            .map(|m| m.text.clone())
        else {
            return false;
        };
        sink.insert_text(&text);
        self.push(ChatMessage::system("✅ Content inserted into the note"));
        true
    }

    /// Submit and wait for the answer in one step.
    pub async fn submit_and_wait<N: NoteSource + NoteSink>(
        &mut self,
        input: &str,
        note: &mut N,
        gateway: &AiGateway,
    ) {
        if let Some(dispatch) = self.submit(input, &*note) {
            let completion = dispatch.run(gateway).await;
            self.complete(completion, note);
        }
    }

    pub async fn quick_generate_and_wait<N: NoteSource + NoteSink>(
        &mut self,
        hint: &str,
        note: &mut N,
        gateway: &AiGateway,
    ) {
        if let Some(dispatch) = self.quick_generate(hint, &*note) {
            let completion = dispatch.run(gateway).await;
            self.complete(completion, note);
        }
    }

    fn route(&mut self, command: ParsedCommand, note: &NoteContext) -> Option<Dispatch> {
        match self.router.route(&command, note) {
            Routed::Clear => {
                self.clear();
                None
            }
            Routed::Reply { text, is_error } => {
                self.push(
                    ChatMessage::ai(text)
                        .with_command(&command.name, &command.args)
                        .flagged_error(is_error),
                );
                None
            }
            Routed::Remote(request) => self.dispatch(
                request,
                Origin::Chat {
                    command: Some(command),
                },
            ),
        }
    }

    fn dispatch(&mut self, request: AiRequest, origin: Origin) -> Option<Dispatch> {
        self.in_flight += 1;
        debug!(operation = ?request.operation(), in_flight = self.in_flight, "request dispatched");
        Some(Dispatch {
            request,
            origin,
            epoch: self.epoch,
        })
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

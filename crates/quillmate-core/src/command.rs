//! Slash commands typed into the assistant chat.
//!
//! Routing is split from execution: [`CommandRouter::route`] validates
//! arguments synchronously and either answers locally or describes the AI
//! request to make, so malformed input never reaches the network.

use tracing::debug;

use crate::ai::{
    AiGateway, AiOperation, AiResponse, ExplainOptions, GatewayError, OptimizeStyle,
    SummarizeOptions,
    TranslateOptions, DEFAULT_SUMMARY_LENGTH, DEFAULT_TAG_COUNT, DEFAULT_TARGET_LANGUAGE,
};
use crate::note::{NoteContext, NoteSink};
use crate::state::ChatMessage;

/// Static catalog entry shown by `/help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub param_hints: &'static [&'static str],
}

pub const COMMANDS: &[Command] = &[
    Command {
        name: "/summarize",
        description: "Summarize the note",
        usage: "/summarize [length]",
        param_hints: &["length (optional, default 200)"],
    },
    Command {
        name: "/translate",
        description: "Translate the note",
        usage: "/translate [target language]",
        param_hints: &["target language (optional, default English)"],
    },
    Command {
        name: "/explain",
        description: "Explain a concept",
        usage: "/explain <concept>",
        param_hints: &["concept (required)"],
    },
    Command {
        name: "/qa",
        description: "Ask a question about the note",
        usage: "/qa <question>",
        param_hints: &["question (required)"],
    },
    Command {
        name: "/optimize",
        description: "Polish the note's writing",
        usage: "/optimize [style]",
        param_hints: &["style (optional: formal, casual, academic, creative)"],
    },
    Command {
        name: "/tags",
        description: "Generate tags for the note",
        usage: "/tags",
        param_hints: &[],
    },
    Command {
        name: "/help",
        description: "Show this help",
        usage: "/help",
        param_hints: &[],
    },
    Command {
        name: "/clear",
        description: "Clear the chat history",
        usage: "/clear",
        param_hints: &[],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// A fully validated request for the AI gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum AiRequest {
    Summarize {
        text: String,
        options: SummarizeOptions,
    },
    Translate {
        text: String,
        options: TranslateOptions,
    },
    Explain {
        concept: String,
        context: String,
        options: ExplainOptions,
    },
    Ask {
        question: String,
        context: String,
    },
    Optimize {
        text: String,
        style: OptimizeStyle,
    },
    Tags {
        text: String,
        max_tags: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiReply {
    Text(AiResponse),
    Tags(Result<Vec<String>, GatewayError>),
}

impl AiRequest {
    pub fn operation(&self) -> AiOperation {
        match self {
            AiRequest::Summarize { .. } => AiOperation::Summarize,
            AiRequest::Translate { .. } => AiOperation::Translate,
            AiRequest::Explain { .. } => AiOperation::Explain,
            AiRequest::Ask { .. } => AiOperation::AskQuestion,
            AiRequest::Optimize { .. } => AiOperation::Optimize,
            AiRequest::Tags { .. } => AiOperation::GenerateTags,
        }
    }

    pub async fn run(&self, gateway: &AiGateway) -> AiReply {
        match self {
            AiRequest::Summarize { text, options } => {
                AiReply::Text(gateway.summarize(text, *options).await)
            }
            AiRequest::Translate { text, options } => {
                AiReply::Text(gateway.translate(text, options).await)
            }
            AiRequest::Explain {
                concept,
                context,
                options,
            } => AiReply::Text(gateway.explain(concept, context, *options).await),
            AiRequest::Ask { question, context } => {
                AiReply::Text(gateway.ask_question(question, context).await)
            }
            AiRequest::Optimize { text, style } => {
                AiReply::Text(gateway.optimize_content(text, *style).await)
            }
            AiRequest::Tags { text, max_tags } => {
                AiReply::Tags(gateway.try_generate_tags(text, *max_tags).await)
            }
        }
    }
}

/// What routing a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Answered locally: help text or a validation error.
    Reply { text: String, is_error: bool },
    /// Reset the chat log.
    Clear,
    Remote(AiRequest),
}

impl Routed {
    fn error(text: impl Into<String>) -> Self {
        Routed::Reply {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Final effect of executing a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Message(ChatMessage),
    ClearLog,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRouter;

impl CommandRouter {
    pub fn new() -> Self {
        Self
    }

    /// Split a `/command arg arg` line on whitespace. No quoting is supported.
    pub fn parse(input: &str) -> Option<ParsedCommand> {
        let trimmed = input.trim();
        if !trimmed.starts_with('/') {
            return None;
        }
        let mut parts = trimmed.split_whitespace();
        let name = parts.next()?.to_string();
        Some(ParsedCommand {
            name,
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn route(&self, command: &ParsedCommand, note: &NoteContext) -> Routed {
        let args = &command.args;
        let text = note.text_to_process().to_string();

        let routed = match command.name.as_str() {
            "/help" => Routed::Reply {
                text: help_text(),
                is_error: false,
            },
            "/clear" => Routed::Clear,
            "/summarize" => match args.first() {
                None => Routed::Remote(AiRequest::Summarize {
                    text,
                    options: SummarizeOptions {
                        max_length: DEFAULT_SUMMARY_LENGTH,
                        language: None,
                    },
                }),
                Some(raw) => match raw.parse::<u32>() {
                    Ok(max_length) if max_length > 0 => Routed::Remote(AiRequest::Summarize {
                        text,
                        options: SummarizeOptions {
                            max_length,
                            language: None,
                        },
                    }),
                    _ => Routed::error(format!(
                        "❌ Error: the length must be a positive whole number, got `{raw}`"
                    )),
                },
            },
            "/translate" => {
                let target = args
                    .first()
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_TARGET_LANGUAGE);
                Routed::Remote(AiRequest::Translate {
                    text,
                    options: TranslateOptions::to(target),
                })
            }
            "/explain" => {
                if args.is_empty() {
                    Routed::error(
                        "❌ Error: please provide a concept to explain\nUsage: `/explain <concept>`",
                    )
                } else {
                    Routed::Remote(AiRequest::Explain {
                        concept: args.join(" "),
                        context: text,
                        options: ExplainOptions::default(),
                    })
                }
            }
            "/qa" => {
                if args.is_empty() {
                    Routed::error("❌ Error: please provide a question\nUsage: `/qa <question>`")
                } else {
                    Routed::Remote(AiRequest::Ask {
                        question: args.join(" "),
                        context: text,
                    })
                }
            }
            "/optimize" => match args.first() {
                None => Routed::Remote(AiRequest::Optimize {
                    text,
                    style: OptimizeStyle::default(),
                }),
                Some(raw) => match OptimizeStyle::from_str(raw) {
                    Some(style) => Routed::Remote(AiRequest::Optimize { text, style }),
                    None => Routed::error(format!(
                        "❌ Error: invalid style `{raw}`\nAvailable styles: {}",
                        OptimizeStyle::NAMES.join(", ")
                    )),
                },
            },
            "/tags" => Routed::Remote(AiRequest::Tags {
                text,
                max_tags: DEFAULT_TAG_COUNT,
            }),
            other => Routed::error(format!(
                "❌ Unknown command: {other}\n\nType `/help` to see all available commands"
            )),
        };

        debug!(command = %command.name, args = args.len(), remote = matches!(routed, Routed::Remote(_)), "routed command");
        routed
    }

    /// Route and, when needed, run a command to completion.
    pub async fn execute(
        &self,
        command: &ParsedCommand,
        raw_input: &str,
        note: &NoteContext,
        gateway: &AiGateway,
        sink: &mut dyn NoteSink,
    ) -> Outcome {
        debug!(input = raw_input, "executing command");
        match self.route(command, note) {
            Routed::Clear => Outcome::ClearLog,
            Routed::Reply { text, is_error } => Outcome::Message(
                ChatMessage::ai(text)
                    .with_command(&command.name, &command.args)
                    .flagged_error(is_error),
            ),
            Routed::Remote(request) => {
                let reply = request.run(gateway).await;
                Outcome::Message(reply_message(Some(command), reply, sink))
            }
        }
    }
}

/// Render the command catalog.
pub fn help_text() -> String {
    let entries: Vec<String> = COMMANDS
        .iter()
        .map(|cmd| {
            let mut entry = format!(
                "**{}** - {}\n   Usage: `{}`",
                cmd.name, cmd.description, cmd.usage
            );
            if !cmd.param_hints.is_empty() {
                entry.push_str("\n   Parameters: ");
                entry.push_str(&cmd.param_hints.join(", "));
            }
            entry
        })
        .collect();
    format!("📚 **Available commands:**\n\n{}", entries.join("\n\n"))
}

/// Turn a finished AI reply into the ai-role message for the chat log.
/// Generated tags are handed to the note before the message is built.
pub(crate) fn reply_message(
    command: Option<&ParsedCommand>,
    reply: AiReply,
    sink: &mut dyn NoteSink,
) -> ChatMessage {
    let message = match reply {
        AiReply::Text(response) => {
            ChatMessage::ai(response.display_text()).flagged_error(response.is_error())
        }
        AiReply::Tags(Ok(tags)) => {
            sink.update_tags(&tags);
            ChatMessage::ai(tags_summary(&tags))
        }
        AiReply::Tags(Err(err)) => ChatMessage::ai(err.to_string()).flagged_error(true),
    };
    match command {
        Some(command) => message.with_command(&command.name, &command.args),
        None => message,
    }
}

pub(crate) fn tags_summary(tags: &[String]) -> String {
    let lines: Vec<String> = tags.iter().map(|tag| format!("• {tag}")).collect();
    format!("🏷️ Generated {} tags:\n{}", tags.len(), lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(content: &str) -> NoteContext {
        NoteContext {
            content: content.to_string(),
            selection: None,
        }
    }

    fn route(input: &str) -> Routed {
        let command = CommandRouter::parse(input).unwrap();
        CommandRouter::new().route(&command, &note("body"))
    }

    #[test]
    fn free_text_is_not_a_command() {
        assert_eq!(CommandRouter::parse("hello /help"), None);
        assert_eq!(CommandRouter::parse(""), None);
        assert_eq!(CommandRouter::parse("   "), None);
    }

    #[test]
    fn parse_splits_on_any_whitespace() {
        let parsed = CommandRouter::parse("  /explain   borrow \t checker ").unwrap();
        assert_eq!(parsed.name, "/explain");
        assert_eq!(parsed.args, vec!["borrow", "checker"]);
    }

    #[test]
    fn summarize_rejects_non_numeric_length() {
        match route("/summarize abc") {
            Routed::Reply { is_error, text } => {
                assert!(is_error);
                assert!(text.contains("abc"));
            }
            other => panic!("expected local error, got {other:?}"),
        }
        assert!(matches!(route("/summarize 0"), Routed::Reply { is_error: true, .. }));
    }

    #[test]
    fn summarize_uses_requested_length() {
        match route("/summarize 120") {
            Routed::Remote(AiRequest::Summarize { options, text }) => {
                assert_eq!(options.max_length, 120);
                assert_eq!(text, "body");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn explain_and_qa_require_arguments() {
        assert!(matches!(route("/explain"), Routed::Reply { is_error: true, .. }));
        assert!(matches!(route("/qa"), Routed::Reply { is_error: true, .. }));
        match route("/qa what is   this") {
            Routed::Remote(AiRequest::Ask { question, .. }) => assert_eq!(question, "what is this"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn optimize_validates_style() {
        assert!(matches!(route("/optimize poetic"), Routed::Reply { is_error: true, .. }));
        assert!(matches!(
            route("/optimize casual"),
            Routed::Remote(AiRequest::Optimize {
                style: OptimizeStyle::Casual,
                ..
            })
        ));
    }

    #[test]
    fn translate_defaults_to_english() {
        match route("/translate") {
            Routed::Remote(AiRequest::Translate { options, .. }) => {
                assert_eq!(options.target_language, "English")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_command_points_to_help() {
        match route("/frobnicate now") {
            Routed::Reply { text, is_error } => {
                assert!(is_error);
                assert!(text.contains("/frobnicate"));
                assert!(text.contains("/help"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for cmd in COMMANDS {
            assert!(help.contains(cmd.usage), "missing {}", cmd.name);
        }
    }

    #[test]
    fn selection_wins_over_note_body() {
        let command = CommandRouter::parse("/tags").unwrap();
        let context = NoteContext {
            content: "whole note".to_string(),
            selection: Some("picked".to_string()),
        };
        match CommandRouter::new().route(&command, &context) {
            Routed::Remote(AiRequest::Tags { text, max_tags }) => {
                assert_eq!(text, "picked");
                assert_eq!(max_tags, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_tag_reply_is_an_error_and_leaves_tags_alone() {
        let mut note = crate::note::Note::new("t", "body");
        note.tags = vec!["kept".to_string()];
        let command = CommandRouter::parse("/tags").unwrap();

        let message = reply_message(
            Some(&command),
            AiReply::Tags(Err(GatewayError::RateLimited)),
            &mut note,
        );
        assert!(message.is_error);
        assert!(message.text.contains("Rate limit"));
        assert_eq!(note.tags, vec!["kept"]);

        let message = reply_message(Some(&command), AiReply::Tags(Ok(Vec::new())), &mut note);
        assert!(!message.is_error);
        assert!(message.text.contains("Generated 0 tags"));
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use quillmate_core::ai::{AiGateway, ChatBackend, CompletionRequest, GatewayError, Language};
use quillmate_core::{NoteSink, NoteSource};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Backend that records every request and answers from a script.
pub struct FakeBackend {
    requests: Mutex<Vec<CompletionRequest>>,
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    fallback: String,
}

impl FakeBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            fallback: text.to_string(),
        })
    }

    pub fn scripted(replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into()),
            fallback: String::new(),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub fn gateway(backend: &Arc<FakeBackend>) -> AiGateway {
    AiGateway::with_backend(backend.clone(), Language::En)
}

/// Note collaborator that records what the assistant did to it.
#[derive(Default)]
pub struct RecordingNote {
    pub content: String,
    pub selection: Option<String>,
    pub inserted: Vec<String>,
    pub tag_updates: Vec<Vec<String>>,
}

impl RecordingNote {
    pub fn with_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..Self::default()
        }
    }
}

impl NoteSource for RecordingNote {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn selected_text(&self) -> Option<String> {
        self.selection.clone()
    }
}

impl NoteSink for RecordingNote {
    fn insert_text(&mut self, text: &str) {
        self.inserted.push(text.to_string());
    }

    fn update_tags(&mut self, tags: &[String]) {
        self.tag_updates.push(tags.to_vec());
    }
}

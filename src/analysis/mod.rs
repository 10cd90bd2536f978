pub mod analyzer;
pub mod openai;
mod prompts;

pub use analyzer::ContentAnalyzer;
pub use openai::OpenAiService;

use crate::error::ServiceError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only message history.
///
/// Appending consumes the conversation and returns the extended one, so a
/// history handed to the service can never change underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.push(Role::User, content.into())
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.push(Role::Assistant, content.into())
    }

    fn push(mut self, role: Role, content: String) -> Self {
        self.turns.push(ChatMessage { role, content });
        self
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Shape the backend is asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub conversation: Conversation,
    pub format: ResponseFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    /// Backend identifier of this response
    pub id: String,
    /// Model that produced it
    pub model: String,
    pub content: String,
}

/// A stateless text-analysis backend: given a conversation, produce the next turn
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn complete(&self, request: AnalysisRequest) -> Result<ServiceResponse, ServiceError>;
}

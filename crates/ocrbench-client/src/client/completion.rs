//! Chat completion wire types.
//!
//! Only the fields the benchmark reads are modeled; everything else the
//! endpoint returns is ignored during deserialization.

use ocrbench_core::PreparedPage;
use serde::{Deserialize, Serialize};

use crate::client::OcrClientConfig;
use crate::error::{Error, Result};

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    pub stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Builds a single-turn request carrying one page image.
    pub fn for_page(config: &'a OcrClientConfig, page: &PreparedPage) -> Self {
        let generation = &config.generation;
        Self {
            model: &config.model,
            messages: vec![ChatMessage::user_image(page.payload.to_data_url())],
            max_tokens: generation.max_output_tokens,
            temperature: generation.temperature,
            top_p: generation.top_p,
            stream: generation.streaming,
        }
    }
}

/// A chat message made of content parts.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// A user message with a single inline image.
    pub fn user_image(data_url: String) -> Self {
        Self {
            role: "user",
            content: vec![ContentPart::ImageUrl {
                image_url: ImageUrl { url: data_url },
            }],
        }
    }
}

/// One part of a multimodal message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Decodes a response body and extracts the first choice's text.
    pub fn text_from_slice(body: &[u8]) -> Result<String> {
        let response: Self = serde_json::from_slice(body)
            .map_err(|e| Error::decode(format!("invalid completion body: {}", e)))?;
        response.into_text()
    }

    /// Extracts `choices[0].message.content`.
    pub fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::decode("response has no choices"))?
            .message
            .ok_or_else(|| Error::decode("first choice has no message"))?
            .content
            .ok_or_else(|| Error::decode("first choice has no content"))
    }
}

/// One event-stream frame.
#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<Delta>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Returns the content fragment of the first choice, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
    }
}

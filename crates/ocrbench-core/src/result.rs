//! Per-page recognition results.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Generation parameters sent with every recognition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff, omitted from requests when unset.
    pub top_p: Option<f32>,
    /// Whether to request an incremental event stream.
    pub streaming: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 4096,
            temperature: 0.2,
            top_p: None,
            streaming: false,
        }
    }
}

/// Outcome of recognizing a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// 1-based page number.
    pub page_number: u32,
    /// Wall-clock time from request issuance to full receipt.
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    /// Extracted transcription.
    pub text: String,
    /// Whitespace word count of `text`.
    pub tokens: usize,
    /// `tokens / duration`, zero when the duration is zero.
    pub tokens_per_sec: f64,
    /// Character count of `text`.
    pub text_length: usize,
}

impl OcrResult {
    /// Builds a result and derives the token statistics from `text`.
    pub fn new(page_number: u32, duration: Duration, text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = estimate_tokens(&text);
        let secs = duration.as_secs_f64();
        let tokens_per_sec = if secs > 0.0 { tokens as f64 / secs } else { 0.0 };

        Self {
            page_number,
            duration,
            text_length: text.chars().count(),
            tokens,
            tokens_per_sec,
            text,
        }
    }
}

/// Rough token estimate: the number of whitespace-delimited words.
///
/// This is not a tokenizer count. It is kept stable so throughput numbers
/// stay comparable across runs.
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_token_statistics() {
        let result = OcrResult::new(3, Duration::from_secs(2), "Hello  brave\nnew world");
        assert_eq!(result.tokens, 4);
        assert_eq!(result.tokens_per_sec, 2.0);
        assert_eq!(result.text_length, 22);
    }

    #[test]
    fn zero_duration_yields_zero_rate() {
        let result = OcrResult::new(1, Duration::ZERO, "a b c");
        assert_eq!(result.tokens_per_sec, 0.0);
    }

    #[test]
    fn serializes_duration_as_seconds() {
        let result = OcrResult::new(1, Duration::from_millis(1500), "x");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["duration"], 1.5);
    }
}

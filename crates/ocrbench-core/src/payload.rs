//! Encoded page payloads ready for transport.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type of lossless PNG payloads.
pub const PNG_MIME_TYPE: &str = "image/png";

/// An encoded image together with its declared MIME type.
///
/// Cloning is cheap: the underlying buffer is reference counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    data: Bytes,
    mime_type: String,
}

impl EncodedPayload {
    /// Creates a payload from raw encoded bytes.
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Creates a PNG payload.
    pub fn png(data: impl Into<Bytes>) -> Self {
        Self::new(data, PNG_MIME_TYPE)
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the declared MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the encoded size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the standard base64 encoding of the payload.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Returns the length of the base64 encoding without allocating it.
    pub fn base64_len(&self) -> usize {
        self.data.len().div_ceil(3) * 4
    }

    /// Returns a `data:` URL embedding the payload.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// A page that has been rasterized and encoded, waiting to be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPage {
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
    /// Encoded image.
    pub payload: EncodedPayload,
}

impl PreparedPage {
    /// Creates a prepared page.
    pub fn new(page_number: u32, width: u32, height: u32, payload: EncodedPayload) -> Self {
        Self {
            page_number,
            width,
            height,
            payload,
        }
    }
}

//! Convenience re-exports for downstream crates.

pub use crate::{
    EncodedPayload, Error, ErrorKind, GenerationParams, OcrProvider, OcrResult, PreparedPage,
    Result,
};

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod payload;
mod provider;
mod result;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
#[doc(hidden)]
pub mod prelude;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::payload::{EncodedPayload, PNG_MIME_TYPE, PreparedPage};
pub use crate::provider::OcrProvider;
pub use crate::result::{GenerationParams, OcrResult, estimate_tokens};

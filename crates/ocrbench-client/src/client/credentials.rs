//! Authentication credentials for OCR endpoints.

use reqwest::RequestBuilder;

/// How requests authenticate against the endpoint.
///
/// Most self-hosted vLLM deployments run without authentication; hosted
/// gateways usually expect a bearer token.
#[derive(Clone, Default)]
pub enum OcrCredentials {
    /// Bearer token sent in the `Authorization` header
    BearerToken(String),
    /// No authentication
    #[default]
    None,
}

impl OcrCredentials {
    /// Create bearer token credentials
    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::BearerToken(token.into())
    }

    /// Create credentials from an optional token, treating blanks as absent
    pub fn from_optional(token: Option<impl Into<String>>) -> Self {
        match token.map(Into::into) {
            Some(token) if !token.trim().is_empty() => Self::BearerToken(token),
            _ => Self::None,
        }
    }

    /// Returns the credential kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BearerToken(_) => "bearer_token",
            Self::None => "none",
        }
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::BearerToken(token) => request.bearer_auth(token),
            Self::None => request,
        }
    }
}

impl std::fmt::Debug for OcrCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

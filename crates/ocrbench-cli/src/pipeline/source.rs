//! Where the benchmarked PDF comes from.

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use bytes::Bytes;
use ocrbench_client::OcrClient;

use crate::TRACING_TARGET_PIPELINE;

/// A PDF on disk or behind an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Local(PathBuf),
    Remote(String),
}

impl DocumentSource {
    /// Interprets `http://` and `https://` values as URLs, anything else as a path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(value.to_string())
        } else {
            Self::Local(PathBuf::from(value))
        }
    }

    /// Reads the whole document into memory.
    pub async fn load(&self, client: &OcrClient) -> anyhow::Result<Bytes> {
        let data = match self {
            Self::Local(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .with_context(|| format!("failed to read PDF from {}", path.display()))?,
            Self::Remote(url) => client
                .download(url)
                .await
                .with_context(|| format!("failed to download PDF from {url}"))?,
        };

        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            source = %self,
            size_bytes = data.len(),
            "Loaded PDF"
        );

        Ok(data)
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn client() -> OcrClient {
        OcrClient::with_defaults("http://127.0.0.1:9").unwrap()
    }

    #[test]
    fn detects_urls_and_paths() {
        assert_eq!(
            DocumentSource::parse("https://example.com/a.pdf"),
            DocumentSource::Remote("https://example.com/a.pdf".into())
        );
        assert_eq!(
            DocumentSource::parse("HTTP://example.com/a.pdf"),
            DocumentSource::Remote("HTTP://example.com/a.pdf".into())
        );
        assert_eq!(
            DocumentSource::parse("./docs/http-spec.pdf"),
            DocumentSource::Local(PathBuf::from("./docs/http-spec.pdf"))
        );
    }

    #[tokio::test]
    async fn loads_local_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let source = DocumentSource::Local(file.path().to_path_buf());
        let data = source.load(&client()).await.unwrap();

        assert_eq!(&data[..], b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn missing_files_name_the_path() {
        let source = DocumentSource::parse("/definitely/not/here.pdf");
        let err = source.load(&client()).await.unwrap_err();

        assert!(format!("{err:#}").contains("/definitely/not/here.pdf"));
    }
}

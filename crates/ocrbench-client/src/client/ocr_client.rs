//! OCR client implementation
//!
//! Sends one chat completion request per page to an OpenAI-compatible
//! endpoint and measures how long the full transcription takes to arrive.

use std::time::Instant;

use bytes::Bytes;
use ocrbench_core::{OcrResult, PreparedPage};
use reqwest::{Client as HttpClient, ClientBuilder, Response};

use super::completion::{ChatCompletionRequest, ChatCompletionResponse};
use super::stream::collect_stream;
use super::{OcrClientConfig, OcrCredentials};
use crate::TRACING_TARGET_CLIENT;
use crate::error::{Error, Result};
use crate::metrics::MetricsCollector;

const COMPLETIONS_PATH: &str = "v1/chat/completions";
const HEALTH_PATH: &str = "health";

/// Client for an OpenAI-compatible OCR endpoint.
///
/// Cloning is cheap and clones share one connection pool, so a single client
/// can serve every concurrent page request.
///
/// # Examples
///
/// ```rust,no_run
/// use ocrbench_client::{OcrClient, OcrClientConfig, OcrCredentials};
///
/// # async fn example() -> ocrbench_client::Result<()> {
/// let config = OcrClientConfig::builder()
///     .with_base_url("http://localhost:8000")?
///     .build()?;
///
/// let client = OcrClient::new(config, OcrCredentials::None)?;
/// client.health_check().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OcrClient {
    http_client: HttpClient,
    config: OcrClientConfig,
    credentials: OcrCredentials,
}

impl OcrClient {
    /// Create a new OCR client with the given configuration and credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OcrClientConfig, credentials: OcrCredentials) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.base_url,
            model = %config.model,
            credentials = credentials.kind(),
            "Creating OCR client"
        );

        let http_client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            config,
            credentials,
        })
    }

    /// Create a client for `base_url` with default settings and no credentials.
    pub fn with_defaults(base_url: impl AsRef<str>) -> Result<Self> {
        let config = OcrClientConfig::builder()
            .with_base_url(base_url.as_ref())?
            .build()?;

        Self::new(config, OcrCredentials::None)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &OcrClientConfig {
        &self.config
    }

    /// Returns a metrics collector sharing this client's connection pool.
    pub fn metrics(&self) -> Result<MetricsCollector> {
        MetricsCollector::from_client(
            self.http_client.clone(),
            &self.config,
            self.credentials.clone(),
        )
    }

    /// Checks that the endpoint answers `GET /health` with a success status.
    pub async fn health_check(&self) -> Result<()> {
        let url = self.config.endpoint(HEALTH_PATH)?;
        tracing::debug!(target: TRACING_TARGET_CLIENT, %url, "Performing health check");

        let request = self.credentials.apply(self.http_client.get(url));
        let response = self.with_deadline(request.send()).await??;
        Self::ensure_success(response).await?;

        tracing::debug!(target: TRACING_TARGET_CLIENT, "Health check successful");
        Ok(())
    }

    /// Downloads a document over HTTP(S) within the request timeout.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let url: url::Url = url.parse()?;
        tracing::info!(target: TRACING_TARGET_CLIENT, %url, "Downloading document");

        let request = self.http_client.get(url);
        let body = self
            .with_deadline(async {
                let response = Self::ensure_success(request.send().await?).await?;
                Ok::<_, Error>(response.bytes().await?)
            })
            .await??;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            size_bytes = body.len(),
            "Downloaded document"
        );
        Ok(body)
    }

    /// Recognizes one page, retrying connection failures and timeouts up to
    /// `max_retries` times.
    ///
    /// The reported duration covers only the successful attempt.
    pub async fn recognize_page(&self, page: &PreparedPage) -> Result<OcrResult> {
        let mut attempt = 0;
        loop {
            match self.attempt(page).await {
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff * attempt;
                    tracing::warn!(
                        target: TRACING_TARGET_CLIENT,
                        page = page.page_number,
                        attempt,
                        max_retries = self.config.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Retrying page"
                    );
                    tokio::time::sleep(backoff).await;
                }
                result => return result,
            }
        }
    }

    async fn attempt(&self, page: &PreparedPage) -> Result<OcrResult> {
        let url = self.config.endpoint(COMPLETIONS_PATH)?;
        let body = ChatCompletionRequest::for_page(&self.config, page);
        let streaming = body.stream;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            page = page.page_number,
            streaming,
            payload_bytes = page.payload.len(),
            "Sending recognition request"
        );

        let started = Instant::now();
        let request = self.credentials.apply(self.http_client.post(url)).json(&body);

        let text = self
            .with_deadline(async {
                let response = Self::ensure_success(request.send().await?).await?;
                let text = if streaming {
                    collect_stream(response.bytes_stream()).await?
                } else {
                    ChatCompletionResponse::text_from_slice(&response.bytes().await?)?
                };
                Ok::<_, Error>(text)
            })
            .await??;

        let result = OcrResult::new(page.page_number, started.elapsed(), text);

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            page = result.page_number,
            duration_ms = result.duration.as_millis() as u64,
            tokens = result.tokens,
            tokens_per_sec = result.tokens_per_sec,
            "Page recognized"
        );

        Ok(result)
    }

    async fn with_deadline<F: Future>(&self, future: F) -> Result<F::Output> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, future)
            .await
            .map_err(|_| Error::Timeout { timeout })
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            "Endpoint returned an error status"
        );
        Err(Error::status(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::extract::State;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use ocrbench_core::{EncodedPayload, ErrorKind, GenerationParams};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::*;
    use crate::client::OcrClientBuilder;

    const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                            data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                            data: [DONE]\n\n";

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn client(
        base_url: &str,
        configure: impl FnOnce(OcrClientBuilder) -> OcrClientBuilder,
    ) -> OcrClient {
        let builder = OcrClientConfig::builder().with_base_url(base_url).unwrap();
        let config = configure(builder).build().unwrap();
        OcrClient::new(config, OcrCredentials::None).unwrap()
    }

    fn page(number: u32) -> PreparedPage {
        PreparedPage::new(number, 4, 4, EncodedPayload::png(vec![9u8; 16]))
    }

    fn completion(text: &str) -> Value {
        json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }] })
    }

    #[tokio::test]
    async fn non_streaming_returns_first_choice() {
        let captured = Arc::new(Mutex::new(None::<Value>));
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(captured): State<Arc<Mutex<Option<Value>>>>,
                     axum::Json(body): axum::Json<Value>| async move {
                        *captured.lock().await = Some(body);
                        axum::Json(completion("one two three"))
                    },
                ),
            )
            .with_state(captured.clone());
        let base = serve(router).await;

        let result = client(&base, |b| b).recognize_page(&page(3)).await.unwrap();

        assert_eq!(result.page_number, 3);
        assert_eq!(result.text, "one two three");
        assert_eq!(result.tokens, 3);

        let body = captured.lock().await.take().unwrap();
        assert_eq!(body["stream"], json!(false));
        assert!(body.get("top_p").is_none());
        let url = body["messages"][0]["content"][0]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn streaming_concatenates_fragments() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { ([(header::CONTENT_TYPE, "text/event-stream")], SSE_BODY) }),
        );
        let base = serve(router).await;

        let client = client(&base, |b| {
            b.with_generation(GenerationParams {
                streaming: true,
                ..GenerationParams::default()
            })
        });
        let result = client.recognize_page(&page(1)).await.unwrap();

        assert_eq!(result.text, "Hello");
        assert_eq!(result.text_length, 5);
    }

    #[tokio::test]
    async fn stream_without_done_is_a_transport_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
                )
            }),
        );
        let base = serve(router).await;

        let client = client(&base, |b| {
            b.with_generation(GenerationParams {
                streaming: true,
                ..GenerationParams::default()
            })
        });
        let err: ocrbench_core::Error = client.recognize_page(&page(1)).await.unwrap_err().into();

        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn error_status_is_reported_with_code() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        );
        let base = serve(router).await;

        let err = client(&base, |b| b).recognize_page(&page(1)).await.unwrap_err();
        assert!(matches!(&err, Error::Status { status: 503, body } if body == "model loading"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn missing_choices_is_a_decode_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { axum::Json(json!({ "choices": [] })) }),
        );
        let base = serve(router).await;

        let err = client(&base, |b| b).recognize_page(&page(1)).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err: ocrbench_core::Error = client(&base, |b| b)
            .recognize_page(&page(1))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(completion("late"))
            }),
        );
        let base = serve(router).await;

        let client = client(&base, |b| b.with_timeout(Duration::from_millis(100)));
        let err = client.recognize_page(&page(1)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn timeouts_are_retried_within_budget() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(|State(attempts): State<Arc<AtomicUsize>>| async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    axum::Json(completion("second time lucky"))
                }),
            )
            .with_state(attempts.clone());
        let base = serve(router).await;

        let client = client(&base, |b| {
            b.with_timeout(Duration::from_millis(200))
                .with_max_retries(1u32)
                .with_retry_backoff(Duration::from_millis(10))
        });
        let result = client.recognize_page(&page(1)).await.unwrap();

        assert_eq!(result.text, "second time lucky");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn health_check_follows_status() {
        let healthy = serve(Router::new().route("/health", get(|| async { "ok" }))).await;
        assert!(client(&healthy, |b| b).health_check().await.is_ok());

        let unhealthy = serve(Router::new().route(
            "/health",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down").into_response() }),
        ))
        .await;
        let err = client(&unhealthy, |b| b).health_check().await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let router = Router::new().route(
            "/health",
            get(|headers: axum::http::HeaderMap| async move {
                match headers.get(header::AUTHORIZATION) {
                    Some(value) if value == "Bearer secret" => StatusCode::OK,
                    _ => StatusCode::UNAUTHORIZED,
                }
            }),
        );
        let base = serve(router).await;

        let config = OcrClientConfig::builder()
            .with_base_url(&base)
            .unwrap()
            .build()
            .unwrap();
        let authorized =
            OcrClient::new(config.clone(), OcrCredentials::bearer_token("secret")).unwrap();
        let anonymous = OcrClient::new(config, OcrCredentials::None).unwrap();

        assert!(authorized.health_check().await.is_ok());
        assert!(matches!(
            anonymous.health_check().await,
            Err(Error::Status { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn downloads_documents() {
        let router = Router::new().route("/doc.pdf", get(|| async { "%PDF-1.4 fake" }));
        let base = serve(router).await;

        let body = client(&base, |b| b)
            .download(&format!("{base}/doc.pdf"))
            .await
            .unwrap();
        assert_eq!(&body[..], b"%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn stalled_downloads_time_out() {
        let router = Router::new().route(
            "/doc.pdf",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "%PDF-1.4 late"
            }),
        );
        let base = serve(router).await;

        let client = client(&base, |b| b.with_timeout(Duration::from_millis(100)));
        let err = client.download(&format!("{base}/doc.pdf")).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}

//! Incremental decoding of `data:`-framed completion streams.

use futures::{Stream, StreamExt};

use crate::TRACING_TARGET_CLIENT;
use crate::client::completion::ChatCompletionChunk;
use crate::error::{Error, Result};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Accumulates streamed content fragments in arrival order.
///
/// Input is buffered until a newline so frames split across network chunks
/// (including inside multi-byte characters) decode correctly. Frames that
/// are not valid JSON are skipped; `[DONE]` ends the stream.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    // Prefix of `pending` already known to hold no newline.
    scanned: usize,
    text: String,
    frames: usize,
    skipped: usize,
    done: bool,
}

impl StreamDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes; returns true once the sentinel has been seen.
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        if self.done {
            return true;
        }

        self.pending.extend_from_slice(chunk);
        while let Some(offset) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') {
            let newline = self.scanned + offset;
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.scanned = 0;
            if self.push_line(&line) {
                self.done = true;
                self.pending.clear();
                break;
            }
        }
        self.scanned = self.pending.len();

        self.done
    }

    /// Flushes an unterminated trailing line; returns true if the stream
    /// was properly terminated.
    pub fn finish(&mut self) -> bool {
        if !self.done && !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.scanned = 0;
            self.done = self.push_line(&line);
        }
        self.done
    }

    /// Number of frames decoded so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of malformed frames skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the decoder, returning the accumulated text.
    pub fn into_text(self) -> String {
        self.text
    }

    fn push_line(&mut self, raw: &[u8]) -> bool {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        let data = line
            .strip_prefix(DATA_PREFIX)
            .map(str::trim_start)
            .unwrap_or(line);
        if data == DONE_SENTINEL {
            return true;
        }

        match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => {
                self.frames += 1;
                if let Some(fragment) = chunk.fragment() {
                    self.text.push_str(fragment);
                }
            }
            Err(err) => {
                self.skipped += 1;
                tracing::trace!(
                    target: TRACING_TARGET_CLIENT,
                    error = %err,
                    "Skipping malformed stream frame"
                );
            }
        }

        false
    }
}

/// Drains a byte stream through a [`StreamDecoder`].
///
/// Fails with [`Error::StreamIncomplete`] if the stream ends before `[DONE]`.
pub async fn collect_stream<S, B, E>(stream: S) -> Result<String>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    Error: From<E>,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = StreamDecoder::new();

    while let Some(chunk) = stream.next().await {
        if decoder.feed(chunk?.as_ref()) {
            break;
        }
    }

    if !decoder.finish() {
        return Err(Error::StreamIncomplete {
            frames: decoder.frames(),
        });
    }

    if decoder.skipped() > 0 {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            frames = decoder.frames(),
            skipped = decoder.skipped(),
            "Stream contained malformed frames"
        );
    }

    Ok(decoder.into_text())
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::stream;

    use super::*;

    const HELLO: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\
                         data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\
                         data: [DONE]\n";

    fn chunks(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<&'static [u8], Infallible>> {
        stream::iter(parts.into_iter().map(Ok))
    }

    impl From<Infallible> for Error {
        fn from(never: Infallible) -> Self {
            match never {}
        }
    }

    #[test]
    fn concatenates_fragments_until_done() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(HELLO.as_bytes()));
        assert_eq!(decoder.text(), "Hello");
        assert_eq!(decoder.frames(), 2);
    }

    #[test]
    fn handles_frames_split_across_chunks() {
        let bytes = "data: {\"choices\":[{\"delta\":{\"content\":\"h\u{e9}\"}}]}\ndata: [DONE]\n";
        let bytes = bytes.as_bytes();
        // Split inside the two-byte 'é'.
        let split = bytes.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut decoder = StreamDecoder::new();
        assert!(!decoder.feed(&bytes[..split]));
        assert!(decoder.feed(&bytes[split..]));
        assert_eq!(decoder.into_text(), "h\u{e9}");
    }

    #[test]
    fn decodes_frames_fed_byte_by_byte() {
        let long = "x".repeat(4096);
        let body = format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{long}\"}}}}]}}\n\
             data: {{\"choices\":[{{\"delta\":{{\"content\":\"!\"}}}}]}}\ndata: [DONE]\n"
        );

        let mut decoder = StreamDecoder::new();
        let mut done = false;
        for byte in body.as_bytes() {
            done = decoder.feed(std::slice::from_ref(byte));
        }

        assert!(done);
        assert_eq!(decoder.frames(), 2);
        assert_eq!(decoder.text(), format!("{long}!"));
    }

    #[test]
    fn skips_malformed_and_empty_frames() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\
                    \n\
                    data: {not json\n\
                    : keep-alive\n\
                    data: {\"choices\":[{\"delta\":{}}]}\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\
                    data: [DONE]\n";

        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(body.as_bytes()));
        assert_eq!(decoder.skipped(), 2);
        assert_eq!(decoder.text(), "ab");
    }

    #[test]
    fn ignores_bytes_after_done() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(HELLO.as_bytes()));
        assert!(decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}\n"));
        assert_eq!(decoder.text(), "Hello");
    }

    #[test]
    fn unterminated_sentinel_is_flushed_on_finish() {
        let mut decoder = StreamDecoder::new();
        assert!(!decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\ndata: [DONE]"));
        assert!(decoder.finish());
        assert_eq!(decoder.text(), "x");
    }

    #[tokio::test]
    async fn collects_a_chunked_stream() {
        let (head, tail) = HELLO.as_bytes().split_at(17);
        let text = collect_stream(chunks(vec![head, tail])).await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn missing_done_is_incomplete() {
        let body: &'static [u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n";
        let result = collect_stream(chunks(vec![body])).await;
        assert!(matches!(result, Err(Error::StreamIncomplete { frames: 1 })));
    }
}

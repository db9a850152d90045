//! Incremental consumption of an SSE answer stream.

use std::fmt::Display;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::time::Instant;

use super::frame::{parse_data_line, SseLineBuffer};
use super::shapes::pick_delta;
use crate::config::STREAM_FIRST_DELTA_TIMEOUT_SECS;

/// How a stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The upstream closed the stream.
    Drained,
    /// Nothing arrived before the deadline.
    Aborted,
    /// A chunk read failed.
    Errored,
}

/// Text accumulated from one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub text: String,
    pub deltas: usize,
    pub end: StreamEnd,
}

impl StreamOutcome {
    /// Whether at least one non-empty delta was applied.
    pub fn received(&self) -> bool {
        self.deltas > 0
    }
}

/// Applies stream deltas in receipt order.
///
/// The deadline only guards the wait for the first delta; once text is
/// flowing the stream runs until the upstream closes it.
#[derive(Debug, Clone)]
pub struct StreamConsumer {
    first_delta_timeout: Duration,
}

impl Default for StreamConsumer {
    fn default() -> Self {
        Self::new(Duration::from_secs(STREAM_FIRST_DELTA_TIMEOUT_SECS))
    }
}

impl StreamConsumer {
    pub fn new(first_delta_timeout: Duration) -> Self {
        Self {
            first_delta_timeout,
        }
    }

    /// Read `stream` to the end, calling `on_delta` for each text delta.
    pub async fn consume<S, E, F>(&self, mut stream: S, mut on_delta: F) -> StreamOutcome
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
        F: FnMut(&str),
    {
        let deadline = Instant::now() + self.first_delta_timeout;
        let mut lines = SseLineBuffer::new();
        let mut text = String::new();
        let mut deltas = 0usize;

        let mut apply = |line: &str, text: &mut String, deltas: &mut usize| {
            let Some(frame) = parse_data_line(line) else {
                return;
            };
            if let Some(delta) = pick_delta(&frame) {
                text.push_str(delta);
                *deltas += 1;
                on_delta(delta);
            }
        };

        let end = loop {
            let next = if deltas > 0 {
                stream.next().await
            } else {
                match tokio::time::timeout_at(deadline, stream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = self.first_delta_timeout.as_secs(),
                            "Stream produced no text before deadline"
                        );
                        break StreamEnd::Aborted;
                    }
                }
            };

            match next {
                Some(Ok(chunk)) => {
                    for line in lines.push(&chunk) {
                        apply(&line, &mut text, &mut deltas);
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, deltas, "Stream read failed");
                    break StreamEnd::Errored;
                }
                None => {
                    if let Some(line) = lines.finish() {
                        apply(&line, &mut text, &mut deltas);
                    }
                    break StreamEnd::Drained;
                }
            }
        };

        tracing::debug!(deltas, chars = text.chars().count(), end = ?end, "Stream consumed");
        StreamOutcome { text, deltas, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    type Chunk = Result<Bytes, String>;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Chunk> + Unpin {
        let items: Vec<Chunk> = parts.iter().map(|p| Ok(Bytes::copy_from_slice(p))).collect();
        stream::iter(items)
    }

    async fn consume_all(parts: &[&[u8]]) -> StreamOutcome {
        StreamConsumer::default().consume(chunks(parts), |_| {}).await
    }

    const TWO_DELTAS: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n",
        "data: [DONE]\n",
    );

    #[tokio::test]
    async fn two_deltas_accumulate() {
        let mut seen = Vec::new();
        let outcome = StreamConsumer::default()
            .consume(chunks(&[TWO_DELTAS.as_bytes()]), |d| seen.push(d.to_string()))
            .await;
        assert_eq!(outcome.text, "AB");
        assert_eq!(outcome.deltas, 2);
        assert_eq!(outcome.end, StreamEnd::Drained);
        assert_eq!(seen, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn split_invariance_at_every_byte() {
        let body = concat!(
            ": keep-alive\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"血圧は\"}}]}\n\n",
            "data: not-json\n",
            "data: {\"output_text\":\"130/80\"}\n",
            "data: {\"text\":\"未満。\"}\n",
            "data: [DONE]\n",
        )
        .as_bytes();
        let whole = consume_all(&[body]).await;
        assert_eq!(whole.text, "血圧は130/80未満。");

        for cut in 0..=body.len() {
            let split = consume_all(&[&body[..cut], &body[cut..]]).await;
            assert_eq!(split.text, whole.text, "cut at {cut}");
        }

        let single_bytes: Vec<&[u8]> = body.chunks(1).collect();
        assert_eq!(consume_all(&single_bytes).await.text, whole.text);
    }

    #[tokio::test]
    async fn unterminated_final_line_is_applied() {
        let outcome = consume_all(&[b"data: {\"text\":\"A\"}".as_slice()]).await;
        assert_eq!(outcome.text, "A");
    }

    #[tokio::test]
    async fn empty_stream_receives_nothing() {
        let outcome = consume_all(&[b"data: [DONE]\n".as_slice()]).await;
        assert!(!outcome.received());
        assert_eq!(outcome.end, StreamEnd::Drained);
    }

    #[tokio::test]
    async fn read_error_keeps_partial_text() {
        let items: Vec<Chunk> = vec![
            Ok(Bytes::from_static(b"data: {\"text\":\"A\"}\n")),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"data: {\"text\":\"B\"}\n")),
        ];
        let outcome = StreamConsumer::default()
            .consume(stream::iter(items), |_| {})
            .await;
        assert_eq!(outcome.text, "A");
        assert_eq!(outcome.end, StreamEnd::Errored);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_aborts_at_deadline() {
        let consumer = StreamConsumer::default();
        let started = Instant::now();
        let outcome = consumer
            .consume(stream::pending::<Chunk>(), |_| {})
            .await;
        assert_eq!(outcome.end, StreamEnd::Aborted);
        assert!(!outcome.received());
        assert!(started.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_ignored_once_text_flows() {
        let first = stream::iter(vec![Ok::<_, String>(Bytes::from_static(
            b"data: {\"text\":\"A\"}\n",
        ))]);
        let late = stream::once(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>(Bytes::from_static(b"data: {\"text\":\"B\"}\n"))
        });
        let outcome = StreamConsumer::default()
            .consume(Box::pin(first.chain(late)), |_| {})
            .await;
        assert_eq!(outcome.text, "AB");
        assert_eq!(outcome.end, StreamEnd::Drained);
    }
}

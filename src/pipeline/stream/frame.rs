//! Line framing for server-sent event streams.
//!
//! Chunks may split anywhere, including inside a multi-byte character,
//! so bytes are buffered and only complete lines are decoded.

use serde_json::Value;

/// Accumulates raw chunks and yields complete lines.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes, without the
    /// line terminator.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Drain whatever is left after the stream ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Parse one SSE line into its JSON payload.
///
/// Non-`data:` lines, the `[DONE]` sentinel and malformed JSON yield
/// `None`.
pub fn parse_data_line(line: &str) -> Option<Value> {
    let payload = line.trim().strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!(error = %e, "Skipping malformed SSE frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yields_only_complete_lines() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(b"data: {\"a\"").is_empty());
        assert_eq!(buf.push(b":1}\ndata: x"), vec!["data: {\"a\":1}"]);
        assert_eq!(buf.push(b"\n\n"), vec!["data: x", ""]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn multibyte_split_is_reassembled() {
        let text = "data: 血圧\n";
        let bytes = text.as_bytes();
        let mut buf = SseLineBuffer::new();
        // "血" is three bytes; cut in the middle of it.
        assert!(buf.push(&bytes[..7]).is_empty());
        assert_eq!(buf.push(&bytes[7..]), vec!["data: 血圧"]);
    }

    #[test]
    fn finish_returns_unterminated_tail() {
        let mut buf = SseLineBuffer::new();
        buf.push(b"data: [DONE]");
        assert_eq!(buf.finish().as_deref(), Some("data: [DONE]"));
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn crlf_lines_parse() {
        let mut buf = SseLineBuffer::new();
        let lines = buf.push(b"data: {\"text\":\"A\"}\r\n");
        assert_eq!(parse_data_line(&lines[0]), Some(json!({"text": "A"})));
    }

    #[test]
    fn data_line_filtering() {
        assert_eq!(parse_data_line("data: {\"x\":1}"), Some(json!({"x": 1})));
        assert_eq!(parse_data_line("  data:{\"x\":1}  "), Some(json!({"x": 1})));
        assert_eq!(parse_data_line("data: [DONE]"), None);
        assert_eq!(parse_data_line("event: message"), None);
        assert_eq!(parse_data_line(": keep-alive"), None);
        assert_eq!(parse_data_line("data: {not json"), None);
        assert_eq!(parse_data_line(""), None);
    }
}

//! Ordered response-shape probes for upstream payloads.
//!
//! Providers disagree on where the text lives. Each list is tried in
//! order and the first string found wins.

use serde_json::Value;

/// Where a streamed delta may live, as JSON pointers.
const DELTA_SHAPES: &[&str] = &[
    "/choices/0/delta/content",
    "/choices/0/message/content",
    "/output_text",
    "/text",
];

/// Where a non-streamed completion may live, as JSON pointers.
const COMPLETION_SHAPES: &[&str] = &[
    "/choices/0/message/content",
    "/choices/0/delta/content",
    "/choices/0/text",
    "/output_text",
    "/data",
    "/output",
    "/content",
    "/message",
    "/result",
    "/response",
    "/thinking/output",
    "/thinking/summary",
];

/// First non-null value along `shapes`.
fn probe<'a>(value: &'a Value, shapes: &[&str]) -> Option<&'a Value> {
    shapes
        .iter()
        .filter_map(|shape| value.pointer(shape))
        .find(|v| !v.is_null())
}

/// Text delta carried by one stream frame. Empty deltas are `None`.
pub fn pick_delta(frame: &Value) -> Option<&str> {
    probe(frame, DELTA_SHAPES)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Answer text of a non-streamed completion, trimmed. The first non-null
/// shape decides; it must be a non-blank string.
pub fn pick_completion_content(body: &Value) -> Option<String> {
    let text = probe(body, COMPLETION_SHAPES)?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

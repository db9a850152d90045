//! Streaming answer consumption: SSE framing, response-shape probing
//! and the first-delta deadline.

pub mod consumer;
pub mod frame;
pub mod shapes;

pub use consumer::{StreamConsumer, StreamEnd, StreamOutcome};
pub use frame::{parse_data_line, SseLineBuffer};
pub use shapes::{pick_completion_content, pick_delta};

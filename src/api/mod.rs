//! HTTP API for browser and CLI clients.
//!
//! Routes live under `/api/`:
//! - `POST /api/chat` relays a chat request, as JSON or as an event stream
//! - `POST /api/meta` resolves citation metadata
//! - `GET /api/health` reports liveness and version

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, shutdown_signal};
pub use types::ApiContext;

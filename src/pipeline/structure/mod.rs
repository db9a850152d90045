//! Audience-specific structure: section checklists, completeness
//! validation, deterministic fallback documents and plain formatting.

pub mod checklist;
pub mod fallback;
pub mod format;
pub mod validator;

pub use checklist::{checklist, SectionMarker};
pub use fallback::{compose_fallback, compose_for_topic, ensure_for_audience, Topic};
pub use format::format_plain;
pub use validator::{missing_sections, needs_structural_fallback, STRUCTURAL_FALLBACK_THRESHOLD};

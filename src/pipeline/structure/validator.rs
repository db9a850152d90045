//! Structural completeness check of generated answers.

use super::checklist::checklist;
use crate::models::{Audience, Language};

/// Missing-section count at which a patient answer is replaced by the
/// structured fallback.
pub const STRUCTURAL_FALLBACK_THRESHOLD: usize = 4;

/// Checklist markers with no match in `text`, in checklist order.
pub fn missing_sections(text: &str, lang: Language, audience: Audience) -> Vec<&'static str> {
    checklist(lang, audience)
        .iter()
        .filter(|marker| !marker.is_present(text))
        .map(|marker| marker.pattern)
        .collect()
}

/// Whether an answer is too unstructured to show as is.
pub fn needs_structural_fallback(missing: &[&str]) -> bool {
    missing.len() >= STRUCTURAL_FALLBACK_THRESHOLD
}

pub mod citation; // URL sanitize / extract / trust filter / classify
pub mod metadata; // Title + DOI lookup behind the bounded cache
pub mod prompt_templates;
pub mod stream; // SSE consumption with first-delta deadline
pub mod structure; // Checklists, validator, fallback documents

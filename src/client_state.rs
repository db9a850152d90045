//! Persisted client state: model, conversation, system prompt, sampling
//! parameters and toggles, stored as one JSON record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ChatMessage;
use crate::upstream::DEFAULT_MODEL;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("State file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not replace state file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Everything the client restores on start. Missing fields take the
/// defaults below; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientState {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub system: String,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_tokens: u32,
    pub stream: bool,
    pub enable_search: bool,
    pub show_citations: bool,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            messages: Vec::new(),
            system: String::new(),
            temperature: 0.2,
            top_p: 0.85,
            top_k: 5,
            max_tokens: 1800,
            stream: true,
            enable_search: false,
            show_citations: true,
        }
    }
}

impl ClientState {
    /// Clear the conversation and the system prompt, keeping parameters.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.system.clear();
    }
}

/// JSON file holding one [`ClientState`], replaced atomically on save.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored state; a missing file yields the defaults.
    pub fn load(&self) -> Result<ClientState, StateError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientState::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load, falling back to defaults when the file is unreadable.
    pub fn load_or_default(&self) -> ClientState {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable client state");
            ClientState::default()
        })
    }

    pub fn save(&self, state: &ClientState) -> Result<(), StateError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, state)?;
        tmp.flush()?;
        tmp.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), messages = state.messages.len(), "Saved client state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert_eq!(store.load().unwrap(), ClientState::default());
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested").join("state.json"));
        let state = ClientState {
            model: "Baichuan4-Turbo".into(),
            messages: vec![
                ChatMessage::user("高血圧の治療は？"),
                ChatMessage::assistant("要約: ..."),
            ],
            system: "custom".into(),
            temperature: 0.15,
            top_p: 0.9,
            top_k: 8,
            max_tokens: 2048,
            stream: false,
            enable_search: true,
            show_citations: false,
        };
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn wire_format_is_camel_case_with_defaults() {
        let json = r#"{"model":"Baichuan-M2","topP":0.5,"maxTokens":512,"unknown":1,
            "messages":[{"role":"assistant","content":"a"}]}"#;
        let state: ClientState = serde_json::from_str(json).unwrap();
        assert_eq!(state.model, "Baichuan-M2");
        assert_eq!(state.top_p, 0.5);
        assert_eq!(state.max_tokens, 512);
        assert_eq!(state.messages[0].role, Role::Assistant);
        assert_eq!(state.temperature, 0.2);
        assert!(state.show_citations);

        let out = serde_json::to_value(&state).unwrap();
        assert!(out.get("enableSearch").is_some());
        assert!(out.get("enable_search").is_none());
    }

    #[test]
    fn corrupt_file_is_an_error_but_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let store = StateStore::new(&path);
        assert!(matches!(store.load(), Err(StateError::Json(_))));
        assert_eq!(store.load_or_default(), ClientState::default());
    }

    #[test]
    fn reset_keeps_parameters() {
        let mut state = ClientState {
            messages: vec![ChatMessage::user("q")],
            system: "s".into(),
            top_k: 9,
            ..Default::default()
        };
        state.reset();
        assert!(state.messages.is_empty());
        assert!(state.system.is_empty());
        assert_eq!(state.top_k, 9);
    }
}

//! Session context.
//!
//! One `Session` per interactive story: it owns the settings store, the
//! raw model config pass-through, and the few flags resolution and
//! broadcasting consult. Created at session start, dropped at session end;
//! there is no process-wide state anywhere in this crate.

use std::path::{Path, PathBuf};

use storyloom_core::BackendCapabilities;

use crate::model::ConfigMap;
use crate::store::SettingsStore;

/// Default directory for persisted per-model settings files.
pub const DEFAULT_SETTINGS_DIR: &str = "settings";

/// Mutable per-session state owned by the host.
pub struct Session {
    /// The authoritative settings store.
    pub settings: SettingsStore,

    /// Whether the story is underway. Once set, a configured author's-note
    /// template no longer back-fills the live template.
    pub story_started: bool,

    /// Raw effective model config from the last model load, kept for
    /// diagnostics and compatibility checks by external collaborators.
    /// Not interpreted further here.
    pub model_config: Option<ConfigMap>,

    /// Capabilities of the active generation backend, refreshed on every
    /// model load. Decides which tuning fields a sync broadcasts.
    pub backend: BackendCapabilities,

    settings_dir: PathBuf,
}

impl Session {
    /// Create a session reading persisted settings under `settings_dir`.
    pub fn new(settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings: SettingsStore::new(),
            story_started: false,
            model_config: None,
            backend: BackendCapabilities::default(),
            settings_dir: settings_dir.into(),
        }
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_DIR)
    }
}

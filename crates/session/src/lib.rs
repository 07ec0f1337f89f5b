//! Storyloom session settings core.
//!
//! This crate reconciles three layered configuration sources into one
//! authoritative live state object, then pushes the resolved values to
//! connected UI clients over a host-supplied pub/sub channel:
//!
//! 1. system defaults (hard-coded in `storyloom-core`)
//! 2. the persisted per-model settings file (`settings/*.v2_settings`)
//! 3. the model's own configuration blob (`config.json` or attached)
//!
//! ```text
//! persisted file + model config
//!         │
//!         ▼
//!    resolver ──▶ SettingsStore ──▶ broadcast_all ──▶ channel subscribers
//! ```
//!
//! The store is session-scoped mutable state with no internal locking;
//! hosts must serialize load and broadcast operations per session. No
//! operation here performs I/O beyond bounded local file reads, and a load
//! that fails leaves no partial state behind (required keys are staged
//! before anything is written).
//!
//! Out of scope: the inference engine, model lifecycle, transport framing
//! and reconnection, authentication, UI rendering.

mod broadcast;
mod discovery;
mod error;
mod fields;
mod markup;
mod model;
mod persistence;
mod resolver;
mod session;
mod store;

pub use broadcast::{broadcast_all, ReactionGate, SyncChannel};
pub use discovery::{config_candidates, discover_model_config, first_present};
pub use error::SettingsError;
pub use fields::{FormatOption, SimpleField, SimpleValue};
pub use markup::sanitize_markup;
pub use model::{ConfigMap, ModelSource};
pub use persistence::{
    load_settings_document, persisted_settings_path, sanitize_model_name, SettingsDocument,
    SETTINGS_FILE_EXT, SETTINGS_FILE_VERSION,
};
pub use resolver::{load_model_config, load_persisted_settings};
pub use session::{Session, DEFAULT_SETTINGS_DIR};
pub use store::{LiveSettings, SettingObserver, SettingsStore};

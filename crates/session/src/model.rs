//! Model collaborator interface.
//!
//! The session core never loads models; it only asks the loaded model for
//! the things settings resolution needs. Hosts implement [`ModelSource`]
//! for whatever their inference layer looks like.

use storyloom_core::{BackendCapabilities, ModelFamily};

/// Raw model configuration mapping, as parsed from `config.json` or
/// attached directly by the model.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// What settings resolution needs to know about the loaded model.
pub trait ModelSource {
    /// Configuration mapping attached directly to the model, if it carries
    /// one. When `None`, resolution falls back to `config.json` discovery
    /// under [`custom_dir`](Self::custom_dir).
    fn attached_config(&self) -> Option<ConfigMap>;

    /// Declared architecture family, used for newline-mode inference.
    fn family(&self) -> ModelFamily;

    /// Custom model directory probed for `config.json`.
    fn custom_dir(&self) -> &str;

    /// Capabilities of the generation backend serving this model.
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }
}

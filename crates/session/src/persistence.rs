//! Persisted per-model settings (load only).
//!
//! Settings live in `settings/<model-name>.v2_settings`, one versioned JSON
//! document per model, with path separators in the model name flattened to
//! underscores. This core only ever reads the file; writing it back is the
//! host's job.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use storyloom_core::NewlineMode;

use crate::error::SettingsError;

/// Extension of persisted per-model settings files.
pub const SETTINGS_FILE_EXT: &str = "v2_settings";

/// Document version this build reads and understands.
pub const SETTINGS_FILE_VERSION: u32 = 2;

/// Flatten path separators out of a model name so it is usable as a file
/// name component.
pub fn sanitize_model_name(model_name: &str) -> String {
    model_name.replace(['/', '\\'], "_")
}

/// Path of the persisted settings file for a model.
pub fn persisted_settings_path(settings_dir: &Path, model_name: &str) -> PathBuf {
    settings_dir.join(format!(
        "{}.{}",
        sanitize_model_name(model_name),
        SETTINGS_FILE_EXT
    ))
}

/// A persisted settings document.
///
/// Every field is optional on disk: absent fields leave the live value
/// untouched when the document is applied, present fields replace it.
/// Model-derived state (bad word ids, welcome banner, break behavior) is
/// deliberately not covered; it is re-derived from model config on every
/// load and persisting it would reintroduce stale overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default = "default_file_version")]
    pub file_version: u32,

    // Samplers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_free: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_pen: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_pen_slope: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_pen_range: Option<u32>,

    // Generation shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_sequences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_gen_tokens: Option<u32>,

    // Structure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler_order: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newline_mode: Option<NewlineMode>,

    // Modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adventure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_scan: Option<bool>,

    // Session behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_prompt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_prompt_gen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_persist: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_gen_mod: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_determinism: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_streaming: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_budget: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_probs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_gen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_multi_gen: Option<bool>,

    // Output formatting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_incomplete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_blank_lines: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_special_chars: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_sentence_spacing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_line: Option<bool>,

    // Author's note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_note_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore_depth: Option<u32>,
}

fn default_file_version() -> u32 {
    SETTINGS_FILE_VERSION
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            file_version: SETTINGS_FILE_VERSION,
            temperature: None,
            top_p: None,
            top_k: None,
            tail_free: None,
            typical: None,
            top_a: None,
            rep_pen: None,
            rep_pen_slope: None,
            rep_pen_range: None,
            output_length: None,
            context_tokens: None,
            gen_sequences: None,
            remote_gen_tokens: None,
            sampler_order: None,
            newline_mode: None,
            adventure: None,
            chat_mode: None,
            dynamic_scan: None,
            use_prompt: None,
            autosave: None,
            no_prompt_gen: None,
            rng_persist: None,
            no_gen_mod: None,
            full_determinism: None,
            output_streaming: None,
            show_budget: None,
            show_probs: None,
            alt_gen: None,
            alt_multi_gen: None,
            trim_incomplete: None,
            remove_blank_lines: None,
            remove_special_chars: None,
            add_sentence_spacing: None,
            single_line: None,
            note_template: None,
            configured_note_template: None,
            note_depth: None,
            lore_depth: None,
        }
    }
}

/// Load the persisted settings document at `path`.
///
/// A missing file is the normal first-run state and returns `Ok(None)`.
/// A file that exists but does not parse is a hard failure.
pub fn load_settings_document(path: &Path) -> Result<Option<SettingsDocument>, SettingsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SettingsError::Io {
                path: path.display().to_string(),
                detail: e.to_string(),
            })
        }
    };

    let doc: SettingsDocument =
        serde_json::from_str(&text).map_err(|e| SettingsError::Malformed {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

    if doc.file_version > SETTINGS_FILE_VERSION {
        log::warn!(
            "{}: document version {} is newer than supported version {}",
            path.display(),
            doc.file_version,
            SETTINGS_FILE_VERSION
        );
    }

    Ok(Some(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_path_flattens_separators() {
        let dir = Path::new("settings");
        assert_eq!(
            persisted_settings_path(dir, "author/novel-6b"),
            PathBuf::from("settings/author_novel-6b.v2_settings")
        );
        assert_eq!(
            persisted_settings_path(dir, "plain-model"),
            PathBuf::from("settings/plain-model.v2_settings")
        );
        assert_eq!(sanitize_model_name("a\\b/c"), "a_b_c");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = persisted_settings_path(tmp.path(), "never-saved");
        let loaded = load_settings_document(&path).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_malformed_document_propagates() {
        let tmp = TempDir::new().unwrap();
        let path = persisted_settings_path(tmp.path(), "broken");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_settings_document(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Malformed { .. }));
    }

    #[test]
    fn test_document_roundtrip_keeps_absent_fields_absent() {
        let doc = SettingsDocument {
            temperature: Some(0.8),
            single_line: Some(true),
            ..SettingsDocument::default()
        };

        let json = serde_json::to_string_pretty(&doc).unwrap();
        assert!(json.contains("temperature"));
        assert!(!json.contains("top_p"));
        assert!(!json.contains("null"));

        let parsed: SettingsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.temperature, Some(0.8));
        assert_eq!(parsed.top_p, None);
    }

    #[test]
    fn test_version_defaults_when_absent() {
        let parsed: SettingsDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.file_version, SETTINGS_FILE_VERSION);
        assert_eq!(SettingsDocument::default().file_version, SETTINGS_FILE_VERSION);
    }
}

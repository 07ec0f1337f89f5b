//! Settings resolution: persisted file and model config merging.
//!
//! Two entry points, called in this order on every model load:
//!
//! 1. [`load_persisted_settings`] replays the user's saved per-model
//!    settings over the system defaults.
//! 2. [`load_model_config`] lets the model override what it must: required
//!    simple fields, family-specific newline handling, and a handful of
//!    optional structured fields.
//!
//! Step ordering inside [`load_model_config`] is load-bearing: later steps
//! override earlier ones (an explicit `newlinemode` beats family
//! inference, the preset is reseeded before the simple fields may touch
//! it again). The required simple fields are decoded and staged before
//! anything is written, so a config missing one of them fails the load
//! with the store and the default preset untouched.

use serde_json::Value;

use storyloom_core::{
    ModelFamily, NewlineMode, FAIRSEQ_COMPAT_MARKER, LEGACY_SAMPLER_STAGE, SAMPLER_STAGE_COUNT,
};

use crate::discovery::discover_model_config;
use crate::error::SettingsError;
use crate::fields::{invalid, require_bool, FormatOption, SimpleField, SimpleValue};
use crate::markup::sanitize_markup;
use crate::model::{ConfigMap, ModelSource};
use crate::persistence::{load_settings_document, persisted_settings_path};
use crate::session::Session;

/// Read the persisted settings file for `model_name` and apply it to the
/// session's store.
///
/// A missing file is the normal first-run state and leaves the store
/// untouched. A file that exists but fails to parse propagates.
pub fn load_persisted_settings(
    session: &mut Session,
    model_name: &str,
) -> Result<(), SettingsError> {
    let path = persisted_settings_path(session.settings_dir(), model_name);
    match load_settings_document(&path)? {
        None => {
            log::debug!("no persisted settings at {}", path.display());
            Ok(())
        }
        Some(doc) => {
            log::info!("loaded persisted settings from {}", path.display());
            session.settings.apply_document(&doc);
            Ok(())
        }
    }
}

/// Let the loaded model override settings.
pub fn load_model_config(
    session: &mut Session,
    model: &dyn ModelSource,
) -> Result<(), SettingsError> {
    let config = effective_config(model)?;

    // Stage every required simple field before mutating anything, so a
    // missing or malformed key leaves store and preset as they were.
    let staged = stage_simple_fields(&config)?;

    session.settings.reset_preset();

    // Family-specific newline handling runs before generic field copying;
    // an explicit `newlinemode` in the config overrides it below. The two
    // rules are mutually exclusive: family membership is disjoint.
    if model.family() == ModelFamily::Xglm || has_fairseq_compat(&config) {
        session
            .settings
            .set_newline_mode(NewlineMode::StripTrailingEos);
    }
    if model.family().preserves_newlines() {
        session.settings.set_newline_mode(NewlineMode::PreserveEos);
    }

    session.backend = model.capabilities();
    session.model_config = Some(config.clone());

    for (field, value) in staged {
        session.settings.commit_simple(field, value);
    }

    apply_structured_overrides(session, &config)
}

/// The model's own config if it carries one, else the first `config.json`
/// found under the candidate directories, else an empty mapping.
fn effective_config(model: &dyn ModelSource) -> Result<ConfigMap, SettingsError> {
    if let Some(config) = model.attached_config() {
        return Ok(config);
    }
    Ok(discover_model_config(model.custom_dir())?.unwrap_or_default())
}

fn stage_simple_fields(
    config: &ConfigMap,
) -> Result<Vec<(SimpleField, SimpleValue)>, SettingsError> {
    SimpleField::ALL
        .iter()
        .map(|field| {
            let raw = config
                .get(field.key())
                .ok_or(SettingsError::MissingKey(field.key()))?;
            Ok((*field, field.decode(raw)?))
        })
        .collect()
}

fn has_fairseq_compat(config: &ConfigMap) -> bool {
    config.get("compat").and_then(Value::as_str) == Some(FAIRSEQ_COMPAT_MARKER)
}

/// The structured overrides, each independently conditional on key
/// presence. A missing key leaves the corresponding field untouched.
fn apply_structured_overrides(
    session: &mut Session,
    config: &ConfigMap,
) -> Result<(), SettingsError> {
    if let Some(raw) = config.get("sampler_order") {
        let order = normalize_sampler_order(decode_sampler_order(raw)?);
        session.settings.set_sampler_order(order);
    }

    if let Some(bag) = config.get("formatoptns") {
        let bag = bag
            .as_object()
            .ok_or_else(|| invalid("formatoptns", "expected a mapping"))?;
        for option in FormatOption::ALL {
            if let Some(raw) = bag.get(option.key()) {
                session
                    .settings
                    .set_format_option(option, require_bool(option.key(), raw)?);
            }
        }
    }

    if let Some(raw) = config.get("welcome") {
        match raw {
            Value::Bool(false) => session.settings.restore_default_welcome(),
            Value::String(text) => session.settings.set_welcome(sanitize_markup(text)),
            other => {
                return Err(invalid(
                    "welcome",
                    format!("expected false or banner text, got {}", other),
                ))
            }
        }
    }

    // Explicit config always wins over model-family inference.
    if let Some(raw) = config.get("newlinemode") {
        let mode: NewlineMode = serde_json::from_value(raw.clone())
            .map_err(|e| invalid("newlinemode", e.to_string()))?;
        session.settings.set_newline_mode(mode);
    }

    if let Some(raw) = config.get("antemplate") {
        let template = raw
            .as_str()
            .ok_or_else(|| invalid("antemplate", "expected a template string"))?;
        session
            .settings
            .set_configured_note_template(template.to_string());
        // A configured template only back-fills the live one before the
        // story starts; after that the live template is the user's.
        if !session.story_started {
            session.settings.set_note_template(template.to_string());
        }
    }

    Ok(())
}

/// Configs predating the repetition-penalty stage omit it from the order;
/// the canonical order always names all stages. Orders that already name
/// every stage pass through verbatim.
fn normalize_sampler_order(mut order: Vec<u8>) -> Vec<u8> {
    if order.len() < SAMPLER_STAGE_COUNT {
        order.insert(0, LEGACY_SAMPLER_STAGE);
    }
    order
}

fn decode_sampler_order(raw: &Value) -> Result<Vec<u8>, SettingsError> {
    let items = raw
        .as_array()
        .ok_or_else(|| invalid("sampler_order", "expected an array of stage ids"))?;
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| invalid("sampler_order", format!("bad stage id {}", item)))
        })
        .collect()
}

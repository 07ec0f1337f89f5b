//! Authoritative in-memory settings state.
//!
//! This module provides the session-scoped settings store. All resolvers
//! write into this single source of truth and the broadcaster reads from
//! it, so every consumer sees one consistent view.
//!
//! Design:
//! - `LiveSettings` is a typed record; every field has a value from the
//!   moment the store exists, so no consumer can observe partial state
//! - Mutation goes through store methods, never raw field writes, so each
//!   change is logged and pushed to registered observers
//! - The default preset is a sub-state of only the sampler numerics,
//!   reseeded and overwritten together with the matching live fields

use serde::Serialize;
use serde_json::Value;

use storyloom_core::{BadWordIds, NewlineMode, SamplerPreset, SystemDefaults};

use crate::fields::{FormatOption, SimpleField, SimpleValue};
use crate::persistence::SettingsDocument;

/// Callback invoked after every store mutation, with the internal store key
/// and the new value. Used for audit/logging; the store itself never
/// persists anything.
pub type SettingObserver = Box<dyn Fn(&'static str, &Value) + Send>;

/// The full live settings record for one session.
///
/// Reads go straight through the public fields (via
/// [`SettingsStore::live`]); writes go through the store.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSettings {
    // Samplers
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub tail_free: f64,
    pub typical: f64,
    pub top_a: f64,
    pub rep_pen: f64,
    pub rep_pen_slope: f64,
    pub rep_pen_range: u32,

    // Generation shape
    pub output_length: u32,
    pub context_tokens: u32,
    pub gen_sequences: u32,
    pub remote_gen_tokens: u32,

    // Model-derived constraints
    pub bad_word_ids: BadWordIds,
    pub no_break_model: bool,
    pub sampler_order: Vec<u8>,
    pub newline_mode: NewlineMode,

    // Modes
    pub adventure: bool,
    pub chat_mode: bool,
    pub dynamic_scan: bool,

    // Session behavior
    pub use_prompt: bool,
    pub autosave: bool,
    pub no_prompt_gen: bool,
    pub rng_persist: bool,
    pub no_gen_mod: bool,
    pub full_determinism: bool,
    pub output_streaming: bool,
    pub show_budget: bool,
    pub show_probs: bool,
    pub alt_gen: bool,
    pub alt_multi_gen: bool,

    // Output formatting
    pub trim_incomplete: bool,
    pub remove_blank_lines: bool,
    pub remove_special_chars: bool,
    pub add_sentence_spacing: bool,
    pub single_line: bool,

    // Author's note
    pub note_template: String,
    pub configured_note_template: String,
    pub note_depth: u32,
    pub lore_depth: u32,

    // Banner
    pub welcome: String,
    pub welcome_default: String,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            temperature: SystemDefaults::TEMPERATURE,
            top_p: SystemDefaults::TOP_P,
            top_k: SystemDefaults::TOP_K,
            tail_free: SystemDefaults::TAIL_FREE,
            typical: SystemDefaults::TYPICAL,
            top_a: SystemDefaults::TOP_A,
            rep_pen: SystemDefaults::REP_PEN,
            rep_pen_slope: SystemDefaults::REP_PEN_SLOPE,
            rep_pen_range: SystemDefaults::REP_PEN_RANGE,
            output_length: SystemDefaults::OUTPUT_LENGTH,
            context_tokens: SystemDefaults::CONTEXT_TOKENS,
            gen_sequences: SystemDefaults::GEN_SEQUENCES,
            remote_gen_tokens: SystemDefaults::REMOTE_GEN_TOKENS,
            bad_word_ids: BadWordIds::new(),
            no_break_model: SystemDefaults::NO_BREAK_MODEL,
            sampler_order: SystemDefaults::SAMPLER_ORDER.to_vec(),
            newline_mode: SystemDefaults::NEWLINE_MODE,
            adventure: SystemDefaults::ADVENTURE,
            chat_mode: SystemDefaults::CHAT_MODE,
            dynamic_scan: SystemDefaults::DYNAMIC_SCAN,
            use_prompt: SystemDefaults::USE_PROMPT,
            autosave: SystemDefaults::AUTOSAVE,
            no_prompt_gen: SystemDefaults::NO_PROMPT_GEN,
            rng_persist: SystemDefaults::RNG_PERSIST,
            no_gen_mod: SystemDefaults::NO_GEN_MOD,
            full_determinism: SystemDefaults::FULL_DETERMINISM,
            output_streaming: SystemDefaults::OUTPUT_STREAMING,
            show_budget: SystemDefaults::SHOW_BUDGET,
            show_probs: SystemDefaults::SHOW_PROBS,
            alt_gen: SystemDefaults::ALT_GEN,
            alt_multi_gen: SystemDefaults::ALT_MULTI_GEN,
            trim_incomplete: SystemDefaults::TRIM_INCOMPLETE,
            remove_blank_lines: SystemDefaults::REMOVE_BLANK_LINES,
            remove_special_chars: SystemDefaults::REMOVE_SPECIAL_CHARS,
            add_sentence_spacing: SystemDefaults::ADD_SENTENCE_SPACING,
            single_line: SystemDefaults::SINGLE_LINE,
            note_template: SystemDefaults::NOTE_TEMPLATE.to_string(),
            configured_note_template: SystemDefaults::NOTE_TEMPLATE.to_string(),
            note_depth: SystemDefaults::NOTE_DEPTH,
            lore_depth: SystemDefaults::LORE_DEPTH,
            welcome: SystemDefaults::WELCOME.to_string(),
            welcome_default: SystemDefaults::WELCOME.to_string(),
        }
    }
}

/// Session-scoped settings store: live record, default preset, observers.
pub struct SettingsStore {
    live: LiveSettings,
    preset: SamplerPreset,
    observers: Vec<SettingObserver>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            live: LiveSettings::default(),
            preset: SamplerPreset::system(),
            observers: Vec::new(),
        }
    }

    /// Read access to the live record.
    pub fn live(&self) -> &LiveSettings {
        &self.live
    }

    /// The default preset restored when a story is reset.
    pub fn preset(&self) -> &SamplerPreset {
        &self.preset
    }

    /// Register a change observer. Observers fire on every mutation, after
    /// the new value is in place.
    pub fn observe(&mut self, observer: impl Fn(&'static str, &Value) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self, key: &'static str, value: &Value) {
        log::trace!("setting {} = {}", key, value);
        for observer in &self.observers {
            observer(key, value);
        }
    }

    fn notify_of<T: Serialize>(&self, key: &'static str, value: &T) {
        let json = serde_json::to_value(value).unwrap_or(Value::Null);
        self.notify(key, &json);
    }

    // ========================================================================
    // Preset
    // ========================================================================

    /// Reseed the default preset from system-wide defaults.
    pub fn reset_preset(&mut self) {
        self.preset = SamplerPreset::system();
        log::debug!("default preset reset to system baseline");
    }

    // ========================================================================
    // Simple-field commit
    // ========================================================================

    /// Apply a staged simple-field value to the live record, mirroring
    /// preset-affecting samplers into the default preset in the same step.
    ///
    /// A value whose shape does not match the field is a programming error
    /// (the decode layer cannot produce one) and panics.
    pub fn commit_simple(&mut self, field: SimpleField, value: SimpleValue) {
        match (field, value) {
            (SimpleField::BadWordIds, SimpleValue::BadWords(v)) => {
                self.live.bad_word_ids = v;
                self.notify_of(field.store_key(), &self.live.bad_word_ids.clone());
            }
            (SimpleField::NoBreakModel, SimpleValue::Toggle(v)) => {
                self.live.no_break_model = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::Temperature, SimpleValue::Float(v)) => {
                self.live.temperature = v;
                self.preset.temperature = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::TopP, SimpleValue::Float(v)) => {
                self.live.top_p = v;
                self.preset.top_p = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::TopK, SimpleValue::Count(v)) => {
                self.live.top_k = v;
                self.preset.top_k = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::TailFree, SimpleValue::Float(v)) => {
                self.live.tail_free = v;
                self.preset.tail_free = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::Typical, SimpleValue::Float(v)) => {
                self.live.typical = v;
                self.preset.typical = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::TopA, SimpleValue::Float(v)) => {
                self.live.top_a = v;
                self.preset.top_a = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::RepPen, SimpleValue::Float(v)) => {
                self.live.rep_pen = v;
                self.preset.rep_pen = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::RepPenSlope, SimpleValue::Float(v)) => {
                self.live.rep_pen_slope = v;
                self.preset.rep_pen_slope = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::RepPenRange, SimpleValue::Count(v)) => {
                self.live.rep_pen_range = v;
                self.preset.rep_pen_range = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::Adventure, SimpleValue::Toggle(v)) => {
                self.live.adventure = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::ChatMode, SimpleValue::Toggle(v)) => {
                self.live.chat_mode = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::DynamicScan, SimpleValue::Toggle(v)) => {
                self.live.dynamic_scan = v;
                self.notify_of(field.store_key(), &v);
            }
            (SimpleField::NewlineMode, SimpleValue::Newline(v)) => {
                self.live.newline_mode = v;
                self.notify_of(field.store_key(), &v);
            }
            (field, value) => {
                panic!("value shape {:?} does not match field {:?}", value, field)
            }
        }
    }

    // ========================================================================
    // Structured setters
    // ========================================================================

    pub fn set_sampler_order(&mut self, order: Vec<u8>) {
        self.live.sampler_order = order;
        self.notify_of("sampler_order", &self.live.sampler_order.clone());
    }

    pub fn set_newline_mode(&mut self, mode: NewlineMode) {
        self.live.newline_mode = mode;
        self.notify_of("newline_mode", &mode);
    }

    pub fn set_format_option(&mut self, option: FormatOption, enabled: bool) {
        match option {
            FormatOption::TrimIncomplete => self.live.trim_incomplete = enabled,
            FormatOption::RemoveBlankLines => self.live.remove_blank_lines = enabled,
            FormatOption::RemoveSpecialChars => self.live.remove_special_chars = enabled,
            FormatOption::AddSentenceSpacing => self.live.add_sentence_spacing = enabled,
            FormatOption::SingleLine => self.live.single_line = enabled,
        }
        self.notify_of(option.key(), &enabled);
    }

    /// Set the welcome banner. Callers sanitize first; the store does not
    /// second-guess its input.
    pub fn set_welcome(&mut self, text: String) {
        self.live.welcome = text;
        self.notify_of("welcome", &self.live.welcome.clone());
    }

    /// Restore the built-in welcome banner (model declared `welcome: false`).
    pub fn restore_default_welcome(&mut self) {
        self.live.welcome = self.live.welcome_default.clone();
        self.notify_of("welcome", &self.live.welcome.clone());
    }

    pub fn set_configured_note_template(&mut self, template: String) {
        self.live.configured_note_template = template;
        self.notify_of(
            "configured_note_template",
            &self.live.configured_note_template.clone(),
        );
    }

    pub fn set_note_template(&mut self, template: String) {
        self.live.note_template = template;
        self.notify_of("note_template", &self.live.note_template.clone());
    }

    // ========================================================================
    // Persisted document
    // ========================================================================

    /// Apply a persisted settings document: every field present in the
    /// document replaces the live value, absent fields keep theirs.
    pub fn apply_document(&mut self, doc: &SettingsDocument) {
        if let Some(v) = doc.temperature {
            self.live.temperature = v;
            self.notify_of("temperature", &v);
        }
        if let Some(v) = doc.top_p {
            self.live.top_p = v;
            self.notify_of("top_p", &v);
        }
        if let Some(v) = doc.top_k {
            self.live.top_k = v;
            self.notify_of("top_k", &v);
        }
        if let Some(v) = doc.tail_free {
            self.live.tail_free = v;
            self.notify_of("tail_free", &v);
        }
        if let Some(v) = doc.typical {
            self.live.typical = v;
            self.notify_of("typical", &v);
        }
        if let Some(v) = doc.top_a {
            self.live.top_a = v;
            self.notify_of("top_a", &v);
        }
        if let Some(v) = doc.rep_pen {
            self.live.rep_pen = v;
            self.notify_of("rep_pen", &v);
        }
        if let Some(v) = doc.rep_pen_slope {
            self.live.rep_pen_slope = v;
            self.notify_of("rep_pen_slope", &v);
        }
        if let Some(v) = doc.rep_pen_range {
            self.live.rep_pen_range = v;
            self.notify_of("rep_pen_range", &v);
        }
        if let Some(v) = doc.output_length {
            self.live.output_length = v;
            self.notify_of("output_length", &v);
        }
        if let Some(v) = doc.context_tokens {
            self.live.context_tokens = v;
            self.notify_of("context_tokens", &v);
        }
        if let Some(v) = doc.gen_sequences {
            self.live.gen_sequences = v;
            self.notify_of("gen_sequences", &v);
        }
        if let Some(v) = doc.remote_gen_tokens {
            self.live.remote_gen_tokens = v;
            self.notify_of("remote_gen_tokens", &v);
        }
        if let Some(ref v) = doc.sampler_order {
            self.set_sampler_order(v.clone());
        }
        if let Some(v) = doc.newline_mode {
            self.set_newline_mode(v);
        }
        if let Some(v) = doc.adventure {
            self.live.adventure = v;
            self.notify_of("adventure", &v);
        }
        if let Some(v) = doc.chat_mode {
            self.live.chat_mode = v;
            self.notify_of("chat_mode", &v);
        }
        if let Some(v) = doc.dynamic_scan {
            self.live.dynamic_scan = v;
            self.notify_of("dynamic_scan", &v);
        }
        if let Some(v) = doc.use_prompt {
            self.live.use_prompt = v;
            self.notify_of("use_prompt", &v);
        }
        if let Some(v) = doc.autosave {
            self.live.autosave = v;
            self.notify_of("autosave", &v);
        }
        if let Some(v) = doc.no_prompt_gen {
            self.live.no_prompt_gen = v;
            self.notify_of("no_prompt_gen", &v);
        }
        if let Some(v) = doc.rng_persist {
            self.live.rng_persist = v;
            self.notify_of("rng_persist", &v);
        }
        if let Some(v) = doc.no_gen_mod {
            self.live.no_gen_mod = v;
            self.notify_of("no_gen_mod", &v);
        }
        if let Some(v) = doc.full_determinism {
            self.live.full_determinism = v;
            self.notify_of("full_determinism", &v);
        }
        if let Some(v) = doc.output_streaming {
            self.live.output_streaming = v;
            self.notify_of("output_streaming", &v);
        }
        if let Some(v) = doc.show_budget {
            self.live.show_budget = v;
            self.notify_of("show_budget", &v);
        }
        if let Some(v) = doc.show_probs {
            self.live.show_probs = v;
            self.notify_of("show_probs", &v);
        }
        if let Some(v) = doc.alt_gen {
            self.live.alt_gen = v;
            self.notify_of("alt_gen", &v);
        }
        if let Some(v) = doc.alt_multi_gen {
            self.live.alt_multi_gen = v;
            self.notify_of("alt_multi_gen", &v);
        }
        if let Some(v) = doc.trim_incomplete {
            self.set_format_option(FormatOption::TrimIncomplete, v);
        }
        if let Some(v) = doc.remove_blank_lines {
            self.set_format_option(FormatOption::RemoveBlankLines, v);
        }
        if let Some(v) = doc.remove_special_chars {
            self.set_format_option(FormatOption::RemoveSpecialChars, v);
        }
        if let Some(v) = doc.add_sentence_spacing {
            self.set_format_option(FormatOption::AddSentenceSpacing, v);
        }
        if let Some(v) = doc.single_line {
            self.set_format_option(FormatOption::SingleLine, v);
        }
        if let Some(ref v) = doc.note_template {
            self.set_note_template(v.clone());
        }
        if let Some(ref v) = doc.configured_note_template {
            self.set_configured_note_template(v.clone());
        }
        if let Some(v) = doc.note_depth {
            self.live.note_depth = v;
            self.notify_of("note_depth", &v);
        }
        if let Some(v) = doc.lore_depth {
            self.live.lore_depth = v;
            self.notify_of("lore_depth", &v);
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn every_field_is_defined_before_any_resolver_runs() {
        let store = SettingsStore::new();
        // Spot-check representative fields against the system defaults.
        assert_eq!(store.live().temperature, SystemDefaults::TEMPERATURE);
        assert_eq!(store.live().sampler_order, SystemDefaults::SAMPLER_ORDER);
        assert_eq!(store.live().newline_mode, NewlineMode::Default);
        assert_eq!(store.live().welcome, store.live().welcome_default);
        assert_eq!(store.preset(), &SamplerPreset::system());
    }

    #[test]
    fn preset_affecting_commit_updates_both_sides() {
        let mut store = SettingsStore::new();
        store.commit_simple(SimpleField::Temperature, SimpleValue::Float(0.7));
        assert_eq!(store.live().temperature, 0.7);
        assert_eq!(store.preset().temperature, 0.7);

        // Non-preset fields leave the preset alone.
        store.commit_simple(SimpleField::Adventure, SimpleValue::Toggle(true));
        assert!(store.live().adventure);
        assert_eq!(store.preset().temperature, 0.7);
    }

    #[test]
    fn reset_preset_does_not_touch_live_values() {
        let mut store = SettingsStore::new();
        store.commit_simple(SimpleField::TopP, SimpleValue::Float(0.42));
        store.reset_preset();
        assert_eq!(store.live().top_p, 0.42);
        assert_eq!(store.preset().top_p, SystemDefaults::TOP_P);
    }

    #[test]
    #[should_panic(expected = "does not match field")]
    fn mismatched_commit_is_a_programming_error() {
        let mut store = SettingsStore::new();
        store.commit_simple(SimpleField::Temperature, SimpleValue::Toggle(true));
    }

    #[test]
    fn observers_see_every_mutation() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut store = SettingsStore::new();
        store.observe(move |key, value| {
            sink.lock().unwrap().push(format!("{}={}", key, value));
        });

        store.commit_simple(SimpleField::Temperature, SimpleValue::Float(0.7));
        store.set_newline_mode(NewlineMode::PreserveEos);
        store.restore_default_welcome();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], "temperature=0.7");
        assert_eq!(seen[1], "newline_mode=\"ns\"");
        assert!(seen[2].starts_with("welcome="));
    }

    #[test]
    fn document_apply_replaces_only_present_fields() {
        let mut store = SettingsStore::new();
        let doc: SettingsDocument = serde_json::from_str(
            r#"{"file_version": 2, "temperature": 1.2, "single_line": true}"#,
        )
        .unwrap();
        store.apply_document(&doc);

        assert_eq!(store.live().temperature, 1.2);
        assert!(store.live().single_line);
        // Untouched field keeps its default.
        assert_eq!(store.live().top_p, SystemDefaults::TOP_P);
        // Wholesale document application does not reseed the preset.
        assert_eq!(store.preset().temperature, SystemDefaults::TEMPERATURE);
    }
}

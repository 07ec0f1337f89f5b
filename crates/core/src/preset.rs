//! Sampler preset record and hard-coded system defaults.

use serde::{Deserialize, Serialize};

use crate::types::NewlineMode;

/// Baseline sampler values restored when a story is reset.
///
/// Exactly the nine sampler-numeric fields; nothing else belongs here.
/// Field names on the wire match the model-config key spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerPreset {
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    #[serde(rename = "tfs")]
    pub tail_free: f64,
    pub typical: f64,
    pub top_a: f64,
    pub rep_pen: f64,
    pub rep_pen_slope: f64,
    pub rep_pen_range: u32,
}

impl SamplerPreset {
    /// The system-wide baseline preset.
    pub fn system() -> Self {
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
        }
    }
}

impl Default for SamplerPreset {
    fn default() -> Self {
        Self::system()
    }
}

// ============================================================================
// System defaults (hard-coded, not in JSON)
// ============================================================================

/// Hard-coded application defaults.
///
/// These are the ultimate fallback values before any persisted settings or
/// model config is applied. Defined in code, not configuration.
pub struct SystemDefaults;

impl SystemDefaults {
    // Samplers
    pub const TEMPERATURE: f64 = 0.5;
    pub const TOP_P: f64 = 0.9;
    pub const TOP_K: u32 = 0;
    pub const TAIL_FREE: f64 = 1.0;
    pub const TYPICAL: f64 = 1.0;
    pub const TOP_A: f64 = 0.0;
    pub const REP_PEN: f64 = 1.1;
    pub const REP_PEN_SLOPE: f64 = 0.7;
    pub const REP_PEN_RANGE: u32 = 1024;

    // Generation shape
    pub const OUTPUT_LENGTH: u32 = 80;
    pub const CONTEXT_TOKENS: u32 = 1024;
    pub const GEN_SEQUENCES: u32 = 1;
    pub const REMOTE_GEN_TOKENS: u32 = 200;

    // Sampler execution order: repetition penalty first, then the numeric
    // stages in declaration order.
    pub const SAMPLER_ORDER: [u8; 7] = [6, 0, 1, 2, 3, 4, 5];

    pub const NEWLINE_MODE: NewlineMode = NewlineMode::Default;

    // Modes and toggles
    pub const ADVENTURE: bool = false;
    pub const CHAT_MODE: bool = false;
    pub const DYNAMIC_SCAN: bool = false;
    pub const NO_BREAK_MODEL: bool = false;
    pub const USE_PROMPT: bool = true;
    pub const AUTOSAVE: bool = false;
    pub const NO_PROMPT_GEN: bool = false;
    pub const RNG_PERSIST: bool = false;
    pub const NO_GEN_MOD: bool = false;
    pub const FULL_DETERMINISM: bool = false;
    pub const OUTPUT_STREAMING: bool = true;
    pub const SHOW_BUDGET: bool = false;
    pub const SHOW_PROBS: bool = false;
    pub const ALT_GEN: bool = false;
    pub const ALT_MULTI_GEN: bool = false;

    // Output formatting
    pub const TRIM_INCOMPLETE: bool = true;
    pub const REMOVE_BLANK_LINES: bool = false;
    pub const REMOVE_SPECIAL_CHARS: bool = false;
    pub const ADD_SENTENCE_SPACING: bool = false;
    pub const SINGLE_LINE: bool = false;

    // Author's note
    pub const NOTE_DEPTH: u32 = 3;
    pub const LORE_DEPTH: u32 = 3;
    pub const NOTE_TEMPLATE: &'static str = "[Author's note: <|>]";

    /// Banner shown until a model declares its own welcome text.
    pub const WELCOME: &'static str =
        "Welcome to Storyloom! Load a model and start writing to begin your story.";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LEGACY_SAMPLER_STAGE, SAMPLER_STAGE_COUNT};

    #[test]
    fn system_preset_matches_defaults() {
        let preset = SamplerPreset::system();
        assert_eq!(preset.temperature, SystemDefaults::TEMPERATURE);
        assert_eq!(preset.rep_pen_range, SystemDefaults::REP_PEN_RANGE);
        assert_eq!(preset, SamplerPreset::default());
    }

    #[test]
    fn preset_serializes_with_wire_keys() {
        let json = serde_json::to_value(SamplerPreset::system()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("temp"));
        assert!(obj.contains_key("tfs"));
        assert!(!obj.contains_key("temperature"));
    }

    #[test]
    fn default_order_is_complete_and_penalty_first() {
        assert_eq!(SystemDefaults::SAMPLER_ORDER.len(), SAMPLER_STAGE_COUNT);
        assert_eq!(SystemDefaults::SAMPLER_ORDER[0], LEGACY_SAMPLER_STAGE);
    }
}

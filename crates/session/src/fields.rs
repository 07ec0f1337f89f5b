//! Descriptor table for the simple model-config fields.
//!
//! Model configs must declare every field enumerated here; a missing key
//! fails the whole load (see `resolver`). The enum is the fixed descriptor
//! set from the data model: external key name, internal store key, and
//! whether a value also reseeds the default preset. An unknown field cannot
//! be expressed, which keeps "unknown field" a compile-time impossibility
//! rather than a runtime branch.

use serde_json::Value;

use storyloom_core::{BadWordIds, NewlineMode};

use crate::error::SettingsError;

/// The simple (scalar or list) fields every model config must declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleField {
    BadWordIds,
    NoBreakModel,
    Temperature,
    TopP,
    TopK,
    TailFree,
    Typical,
    TopA,
    RepPen,
    RepPenSlope,
    RepPenRange,
    Adventure,
    ChatMode,
    DynamicScan,
    NewlineMode,
}

/// A decoded value for a [`SimpleField`], staged before commit.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    Float(f64),
    Count(u32),
    Toggle(bool),
    BadWords(BadWordIds),
    Newline(NewlineMode),
}

impl SimpleField {
    /// Every simple field, in application order.
    pub const ALL: [SimpleField; 15] = [
        SimpleField::BadWordIds,
        SimpleField::NoBreakModel,
        SimpleField::Temperature,
        SimpleField::TopP,
        SimpleField::TopK,
        SimpleField::TailFree,
        SimpleField::Typical,
        SimpleField::TopA,
        SimpleField::RepPen,
        SimpleField::RepPenSlope,
        SimpleField::RepPenRange,
        SimpleField::Adventure,
        SimpleField::ChatMode,
        SimpleField::DynamicScan,
        SimpleField::NewlineMode,
    ];

    /// External config key.
    pub fn key(&self) -> &'static str {
        match self {
            SimpleField::BadWordIds => "badwordsids",
            SimpleField::NoBreakModel => "nobreakmodel",
            SimpleField::Temperature => "temp",
            SimpleField::TopP => "top_p",
            SimpleField::TopK => "top_k",
            SimpleField::TailFree => "tfs",
            SimpleField::Typical => "typical",
            SimpleField::TopA => "top_a",
            SimpleField::RepPen => "rep_pen",
            SimpleField::RepPenSlope => "rep_pen_slope",
            SimpleField::RepPenRange => "rep_pen_range",
            SimpleField::Adventure => "adventure",
            SimpleField::ChatMode => "chatmode",
            SimpleField::DynamicScan => "dynamicscan",
            SimpleField::NewlineMode => "newlinemode",
        }
    }

    /// Internal store field name. Defaults to the external key; named
    /// explicitly where the store spells it differently.
    pub fn store_key(&self) -> &'static str {
        match self {
            SimpleField::BadWordIds => "bad_word_ids",
            SimpleField::NoBreakModel => "no_break_model",
            SimpleField::Temperature => "temperature",
            SimpleField::TailFree => "tail_free",
            SimpleField::ChatMode => "chat_mode",
            SimpleField::DynamicScan => "dynamic_scan",
            SimpleField::NewlineMode => "newline_mode",
            other => other.key(),
        }
    }

    /// True for fields that also reseed the default preset when applied
    /// from model config.
    pub fn affects_default_preset(&self) -> bool {
        matches!(
            self,
            SimpleField::Temperature
                | SimpleField::TopP
                | SimpleField::TopK
                | SimpleField::TailFree
                | SimpleField::Typical
                | SimpleField::TopA
                | SimpleField::RepPen
                | SimpleField::RepPenSlope
                | SimpleField::RepPenRange
        )
    }

    /// Decode the raw config value for this field.
    pub fn decode(&self, value: &Value) -> Result<SimpleValue, SettingsError> {
        match self {
            SimpleField::Temperature
            | SimpleField::TopP
            | SimpleField::TailFree
            | SimpleField::Typical
            | SimpleField::TopA
            | SimpleField::RepPen
            | SimpleField::RepPenSlope => require_f64(self.key(), value).map(SimpleValue::Float),

            SimpleField::TopK | SimpleField::RepPenRange => {
                require_u32(self.key(), value).map(SimpleValue::Count)
            }

            SimpleField::NoBreakModel
            | SimpleField::Adventure
            | SimpleField::ChatMode
            | SimpleField::DynamicScan => require_bool(self.key(), value).map(SimpleValue::Toggle),

            SimpleField::BadWordIds => serde_json::from_value::<BadWordIds>(value.clone())
                .map(SimpleValue::BadWords)
                .map_err(|e| invalid(self.key(), e.to_string())),

            SimpleField::NewlineMode => serde_json::from_value::<NewlineMode>(value.clone())
                .map(SimpleValue::Newline)
                .map_err(|e| invalid(self.key(), e.to_string())),
        }
    }
}

// ============================================================================
// Formatting option bag
// ============================================================================

/// The known toggles inside the nested `formatoptns` config mapping.
///
/// Unlike [`SimpleField`], these are all optional: a toggle absent from the
/// bag leaves the store field untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOption {
    TrimIncomplete,
    RemoveBlankLines,
    RemoveSpecialChars,
    AddSentenceSpacing,
    SingleLine,
}

impl FormatOption {
    pub const ALL: [FormatOption; 5] = [
        FormatOption::TrimIncomplete,
        FormatOption::RemoveBlankLines,
        FormatOption::RemoveSpecialChars,
        FormatOption::AddSentenceSpacing,
        FormatOption::SingleLine,
    ];

    /// Key inside the `formatoptns` mapping.
    pub fn key(&self) -> &'static str {
        match self {
            FormatOption::TrimIncomplete => "frmttriminc",
            FormatOption::RemoveBlankLines => "frmtrmblln",
            FormatOption::RemoveSpecialChars => "frmtrmspch",
            FormatOption::AddSentenceSpacing => "frmtadsnsp",
            FormatOption::SingleLine => "singleline",
        }
    }
}

// ============================================================================
// Value decoding helpers
// ============================================================================

pub(crate) fn invalid(key: &str, detail: impl Into<String>) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        detail: detail.into(),
    }
}

pub(crate) fn require_f64(key: &str, value: &Value) -> Result<f64, SettingsError> {
    value
        .as_f64()
        .ok_or_else(|| invalid(key, format!("expected a number, got {}", value)))
}

pub(crate) fn require_u32(key: &str, value: &Value) -> Result<u32, SettingsError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(key, format!("expected a non-negative integer, got {}", value)))
}

pub(crate) fn require_bool(key: &str, value: &Value) -> Result<bool, SettingsError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(key, format!("expected a boolean, got {}", value)))
}

//! Newline handling and sampler order primitives.

use serde::{Deserialize, Serialize};

/// How the end-of-sequence/newline token is interpreted for the active
/// model family.
///
/// # Serialization
/// The wire spelling is frozen for compatibility with existing model
/// configs and persisted settings: `"n"` / `"s"` / `"ns"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewlineMode {
    /// Newlines pass through untouched.
    #[default]
    #[serde(rename = "n")]
    Default,
    /// A trailing end-of-sequence token is stripped; newlines are converted
    /// to sentence-boundary tokens on the way in.
    #[serde(rename = "s")]
    StripTrailingEos,
    /// The end-of-sequence token is handled but newlines are preserved
    /// verbatim (families trained with literal newline tokens).
    #[serde(rename = "ns")]
    PreserveEos,
}

/// Number of sampler stages a fully specified execution order names.
pub const SAMPLER_STAGE_COUNT: usize = 7;

/// Stage identifier for the repetition-penalty stage.
///
/// Older configs predate this stage and omit it from `sampler_order`;
/// normalization prepends it so the penalty runs first.
pub const LEGACY_SAMPLER_STAGE: u8 = 6;

/// Token-id sequences the generator must never emit.
pub type BadWordIds = Vec<Vec<i64>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_mode_wire_spelling() {
        assert_eq!(serde_json::to_string(&NewlineMode::Default).unwrap(), "\"n\"");
        assert_eq!(
            serde_json::to_string(&NewlineMode::StripTrailingEos).unwrap(),
            "\"s\""
        );
        assert_eq!(
            serde_json::to_string(&NewlineMode::PreserveEos).unwrap(),
            "\"ns\""
        );
    }

    #[test]
    fn newline_mode_roundtrip() {
        for mode in [
            NewlineMode::Default,
            NewlineMode::StripTrailingEos,
            NewlineMode::PreserveEos,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            let parsed: NewlineMode = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn newline_mode_rejects_unknown_spelling() {
        assert!(serde_json::from_str::<NewlineMode>("\"sn\"").is_err());
    }
}

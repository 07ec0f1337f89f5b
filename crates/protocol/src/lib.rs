//! Storyloom Session Sync Protocol (v1 frozen wire format)
//!
//! This crate defines the canonical event types pushed from the session core
//! to connected UI clients. Payloads are JSON objects published on a
//! host-supplied pub/sub channel; the transport (framing, reconnection,
//! rooms) is not implemented here.
//!
//! # Protocol Version
//!
//! This is **protocol v1**; the wire format is frozen. Changes require:
//! 1. Version bump in PROTOCOL_VERSION
//! 2. Updated golden assertions in this crate's tests
//! 3. Backward compatibility handling in the legacy UI
//!
//! # Usage
//!
//! ```
//! use storyloom_protocol::{SyncEvent, SYNC_EVENT_NAME};
//!
//! let ev = SyncEvent::Temperature(0.7);
//! let json = serde_json::to_string(&ev).unwrap();
//! assert_eq!(json, r#"{"kind":"temperature","value":0.7}"#);
//! ```

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Channel event name every sync payload is published under.
pub const SYNC_EVENT_NAME: &str = "sync_update";

// =============================================================================
// Rooms
// =============================================================================

/// A named broadcast target representing a set of subscribers.
///
/// The session core only ever targets the legacy UI room; the enum exists so
/// new surfaces get a typed identifier instead of a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Room {
    /// Legacy UI clients.
    LegacyUi,
}

impl Room {
    pub fn as_str(&self) -> &'static str {
        match self {
            Room::LegacyUi => "legacy_ui",
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sync events
// =============================================================================

/// One typed update pushed to subscribers during a settings sync.
///
/// Every variant carries `{"kind": <tag>, "value": <payload>}` on the wire.
/// The suspend/resume bracket around a full sync is expressed with
/// [`SyncEvent::AllowReactions`]: `false` before the field updates, `true`
/// after, so clients can apply the batch without firing per-field reaction
/// handlers mid-sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SyncEvent {
    /// Control bracket: suspend (`false`) / resume (`true`) UI reactions.
    AllowReactions(bool),

    // Generation tuning (full panel, local-tuning backends)
    Temperature(f64),
    TopP(f64),
    TopK(u32),
    TailFree(f64),
    Typical(f64),
    TopA(f64),
    RepPen(f64),
    RepPenSlope(f64),
    RepPenRange(u32),
    OutputLength(u32),
    ContextTokens(u32),
    GenSequences(u32),

    /// Generation amount for remote/hosted backends.
    RemoteGenTokens(u32),

    // Story context
    NoteDepth(u32),
    LoreDepth(u32),
    UsePrompt(bool),

    // Modes
    Adventure(bool),
    ChatMode(bool),
    DynamicScan(bool),

    // Session behavior
    Autosave(bool),
    NoPromptGen(bool),
    RngPersist(bool),
    NoGenMod(bool),
    FullDeterminism(bool),

    // Output formatting
    TrimIncomplete(bool),
    RemoveBlankLines(bool),
    RemoveSpecialChars(bool),
    AddSentenceSpacing(bool),
    SingleLine(bool),

    // Streaming / telemetry
    OutputStreaming(bool),
    ShowBudget(bool),
    ShowProbs(bool),
    AltGen(bool),
    AltMultiGen(bool),
}

impl SyncEvent {
    /// The wire tag of this event (the serialized `kind` field).
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::AllowReactions(_) => "allow_reactions",
            SyncEvent::Temperature(_) => "temperature",
            SyncEvent::TopP(_) => "top_p",
            SyncEvent::TopK(_) => "top_k",
            SyncEvent::TailFree(_) => "tail_free",
            SyncEvent::Typical(_) => "typical",
            SyncEvent::TopA(_) => "top_a",
            SyncEvent::RepPen(_) => "rep_pen",
            SyncEvent::RepPenSlope(_) => "rep_pen_slope",
            SyncEvent::RepPenRange(_) => "rep_pen_range",
            SyncEvent::OutputLength(_) => "output_length",
            SyncEvent::ContextTokens(_) => "context_tokens",
            SyncEvent::GenSequences(_) => "gen_sequences",
            SyncEvent::RemoteGenTokens(_) => "remote_gen_tokens",
            SyncEvent::NoteDepth(_) => "note_depth",
            SyncEvent::LoreDepth(_) => "lore_depth",
            SyncEvent::UsePrompt(_) => "use_prompt",
            SyncEvent::Adventure(_) => "adventure",
            SyncEvent::ChatMode(_) => "chat_mode",
            SyncEvent::DynamicScan(_) => "dynamic_scan",
            SyncEvent::Autosave(_) => "autosave",
            SyncEvent::NoPromptGen(_) => "no_prompt_gen",
            SyncEvent::RngPersist(_) => "rng_persist",
            SyncEvent::NoGenMod(_) => "no_gen_mod",
            SyncEvent::FullDeterminism(_) => "full_determinism",
            SyncEvent::TrimIncomplete(_) => "trim_incomplete",
            SyncEvent::RemoveBlankLines(_) => "remove_blank_lines",
            SyncEvent::RemoveSpecialChars(_) => "remove_special_chars",
            SyncEvent::AddSentenceSpacing(_) => "add_sentence_spacing",
            SyncEvent::SingleLine(_) => "single_line",
            SyncEvent::OutputStreaming(_) => "output_streaming",
            SyncEvent::ShowBudget(_) => "show_budget",
            SyncEvent::ShowProbs(_) => "show_probs",
            SyncEvent::AltGen(_) => "alt_gen",
            SyncEvent::AltMultiGen(_) => "alt_multi_gen",
        }
    }

    /// True for the suspend/resume control bracket events.
    pub fn is_control(&self) -> bool {
        matches!(self, SyncEvent::AllowReactions(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let ev = SyncEvent::Temperature(0.7);
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"kind":"temperature","value":0.7}"#);

        let parsed: SyncEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ev);
    }

    #[test]
    fn test_control_bracket_serialization() {
        let suspend = SyncEvent::AllowReactions(false);
        let json = serde_json::to_string(&suspend).unwrap();
        assert_eq!(json, r#"{"kind":"allow_reactions","value":false}"#);
        assert!(suspend.is_control());
        assert!(!SyncEvent::TopP(0.9).is_control());
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        // The kind() table is the public contract; a serde rename that
        // drifts from it breaks clients silently.
        let events = [
            SyncEvent::AllowReactions(true),
            SyncEvent::Temperature(0.5),
            SyncEvent::TopP(0.9),
            SyncEvent::TopK(40),
            SyncEvent::TailFree(1.0),
            SyncEvent::Typical(1.0),
            SyncEvent::TopA(0.0),
            SyncEvent::RepPen(1.1),
            SyncEvent::RepPenSlope(0.7),
            SyncEvent::RepPenRange(1024),
            SyncEvent::OutputLength(80),
            SyncEvent::ContextTokens(1024),
            SyncEvent::GenSequences(1),
            SyncEvent::RemoteGenTokens(200),
            SyncEvent::NoteDepth(3),
            SyncEvent::LoreDepth(3),
            SyncEvent::UsePrompt(true),
            SyncEvent::Adventure(false),
            SyncEvent::ChatMode(false),
            SyncEvent::DynamicScan(false),
            SyncEvent::Autosave(false),
            SyncEvent::NoPromptGen(false),
            SyncEvent::RngPersist(false),
            SyncEvent::NoGenMod(false),
            SyncEvent::FullDeterminism(false),
            SyncEvent::TrimIncomplete(true),
            SyncEvent::RemoveBlankLines(false),
            SyncEvent::RemoveSpecialChars(false),
            SyncEvent::AddSentenceSpacing(false),
            SyncEvent::SingleLine(false),
            SyncEvent::OutputStreaming(true),
            SyncEvent::ShowBudget(false),
            SyncEvent::ShowProbs(false),
            SyncEvent::AltGen(false),
            SyncEvent::AltMultiGen(false),
        ];

        for ev in events {
            let json = serde_json::to_value(&ev).unwrap();
            assert_eq!(json["kind"], ev.kind(), "tag drift for {:?}", ev);
            assert!(json.get("value").is_some(), "missing value for {:?}", ev);
        }
    }

    #[test]
    fn test_room_identifier() {
        assert_eq!(Room::LegacyUi.as_str(), "legacy_ui");
        assert_eq!(Room::LegacyUi.to_string(), "legacy_ui");
        let json = serde_json::to_string(&Room::LegacyUi).unwrap();
        assert_eq!(json, "\"legacy_ui\"");
    }
}

//! Settings sync broadcasting.
//!
//! On demand, the current store contents are serialized into a sequence of
//! typed [`SyncEvent`]s and published to every subscriber of the legacy UI
//! room, bracketed by a suspend/resume control pair so clients never react
//! to a half-applied batch.
//!
//! Design:
//! - The channel is supplied by the host; publishing is fire-and-forget
//!   with no acknowledgement and no retry. A disconnected subscriber just
//!   misses the update.
//! - The bracket is a scoped guard: constructing [`ReactionGate`] emits
//!   suspend, dropping it emits resume, so resume goes out on every exit
//!   path.
//! - Which tuning fields are sent depends on the backend's declared
//!   capabilities, not on its name.

use serde_json::Value;

use storyloom_protocol::{Room, SyncEvent, SYNC_EVENT_NAME};

use crate::session::Session;

/// Host-supplied publish/subscribe channel.
///
/// Implementations must deliver events to each subscriber in publish
/// order; nothing here compensates for reordering.
pub trait SyncChannel {
    fn publish(&self, event: &str, payload: Value, room: Room);
}

fn emit(channel: &dyn SyncChannel, event: SyncEvent) {
    match serde_json::to_value(&event) {
        Ok(payload) => channel.publish(SYNC_EVENT_NAME, payload, Room::LegacyUi),
        Err(e) => log::warn!("dropping sync event '{}': {}", event.kind(), e),
    }
}

/// Scoped suspend/resume bracket for UI reactions.
///
/// Construction publishes the suspend control event; dropping the gate
/// publishes resume. Field updates emitted while the gate is alive reach
/// clients strictly between the two.
pub struct ReactionGate<'a> {
    channel: &'a dyn SyncChannel,
}

impl<'a> ReactionGate<'a> {
    pub fn suspend(channel: &'a dyn SyncChannel) -> Self {
        emit(channel, SyncEvent::AllowReactions(false));
        Self { channel }
    }
}

impl Drop for ReactionGate<'_> {
    fn drop(&mut self) {
        emit(self.channel, SyncEvent::AllowReactions(true));
    }
}

/// Publish the full current settings state to the legacy UI room.
pub fn broadcast_all(channel: &dyn SyncChannel, session: &Session) {
    let live = session.settings.live();
    let _gate = ReactionGate::suspend(channel);

    if session.backend.local_tuning {
        emit(channel, SyncEvent::Temperature(live.temperature));
        emit(channel, SyncEvent::TopP(live.top_p));
        emit(channel, SyncEvent::TopK(live.top_k));
        emit(channel, SyncEvent::TailFree(live.tail_free));
        emit(channel, SyncEvent::Typical(live.typical));
        emit(channel, SyncEvent::TopA(live.top_a));
        emit(channel, SyncEvent::RepPen(live.rep_pen));
        emit(channel, SyncEvent::RepPenSlope(live.rep_pen_slope));
        emit(channel, SyncEvent::RepPenRange(live.rep_pen_range));
        emit(channel, SyncEvent::OutputLength(live.output_length));
        emit(channel, SyncEvent::ContextTokens(live.context_tokens));
        emit(channel, SyncEvent::GenSequences(live.gen_sequences));
    } else {
        // Hosted backends surface only the reduced tuning panel.
        emit(channel, SyncEvent::Temperature(live.temperature));
        emit(channel, SyncEvent::TopP(live.top_p));
        emit(channel, SyncEvent::RemoteGenTokens(live.remote_gen_tokens));
    }

    emit(channel, SyncEvent::NoteDepth(live.note_depth));
    emit(channel, SyncEvent::LoreDepth(live.lore_depth));
    emit(channel, SyncEvent::UsePrompt(live.use_prompt));
    emit(channel, SyncEvent::Adventure(live.adventure));
    emit(channel, SyncEvent::ChatMode(live.chat_mode));
    emit(channel, SyncEvent::DynamicScan(live.dynamic_scan));
    emit(channel, SyncEvent::Autosave(live.autosave));
    emit(channel, SyncEvent::NoPromptGen(live.no_prompt_gen));
    emit(channel, SyncEvent::RngPersist(live.rng_persist));
    emit(channel, SyncEvent::NoGenMod(live.no_gen_mod));
    emit(channel, SyncEvent::FullDeterminism(live.full_determinism));
    emit(channel, SyncEvent::TrimIncomplete(live.trim_incomplete));
    emit(channel, SyncEvent::RemoveBlankLines(live.remove_blank_lines));
    emit(channel, SyncEvent::RemoveSpecialChars(live.remove_special_chars));
    emit(channel, SyncEvent::AddSentenceSpacing(live.add_sentence_spacing));
    emit(channel, SyncEvent::SingleLine(live.single_line));
    emit(channel, SyncEvent::OutputStreaming(live.output_streaming));
    emit(channel, SyncEvent::ShowBudget(live.show_budget));
    emit(channel, SyncEvent::ShowProbs(live.show_probs));
    emit(channel, SyncEvent::AltGen(live.alt_gen));
    emit(channel, SyncEvent::AltMultiGen(live.alt_multi_gen));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use storyloom_core::BackendCapabilities;

    /// Test channel that records every published event in order.
    pub(crate) struct RecordingChannel {
        pub events: Mutex<Vec<(String, Value, Room)>>,
    }

    impl RecordingChannel {
        pub fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        pub fn kinds(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|(_, payload, _)| payload["kind"].as_str().unwrap_or("?").to_string())
                .collect()
        }
    }

    impl SyncChannel for RecordingChannel {
        fn publish(&self, event: &str, payload: Value, room: Room) {
            self.events
                .lock()
                .unwrap()
                .push((event.to_string(), payload, room));
        }
    }

    #[test]
    fn full_panel_broadcast_is_bracketed_and_complete() {
        let channel = RecordingChannel::new();
        let session = Session::default();

        broadcast_all(&channel, &session);

        let kinds = channel.kinds();
        // Suspend, 12 tuning events, 21 unconditional events, resume.
        assert_eq!(kinds.len(), 1 + 12 + 21 + 1);
        assert_eq!(kinds.first().map(String::as_str), Some("allow_reactions"));
        assert_eq!(kinds.last().map(String::as_str), Some("allow_reactions"));
        assert_eq!(
            kinds.iter().filter(|k| *k == "allow_reactions").count(),
            2
        );

        let events = channel.events.lock().unwrap();
        // Suspend first, resume last.
        assert_eq!(events.first().unwrap().1["value"], false);
        assert_eq!(events.last().unwrap().1["value"], true);
        // Everything goes to the legacy UI room under the sync event name.
        assert!(events
            .iter()
            .all(|(name, _, room)| name == SYNC_EVENT_NAME && *room == Room::LegacyUi));
        // Field updates stay strictly inside the bracket.
        assert!(kinds[1..kinds.len() - 1]
            .iter()
            .all(|k| k != "allow_reactions"));
    }

    #[test]
    fn remote_backend_broadcasts_reduced_panel() {
        let channel = RecordingChannel::new();
        let mut session = Session::default();
        session.backend = BackendCapabilities {
            local_tuning: false,
        };

        broadcast_all(&channel, &session);

        let kinds = channel.kinds();
        assert_eq!(kinds.len(), 1 + 3 + 21 + 1);
        assert!(kinds.contains(&"remote_gen_tokens".to_string()));
        assert!(!kinds.contains(&"top_k".to_string()));
        assert!(!kinds.contains(&"gen_sequences".to_string()));
        // The unconditional tail is backend-independent.
        assert!(kinds.contains(&"note_depth".to_string()));
        assert!(kinds.contains(&"alt_multi_gen".to_string()));
    }

    #[test]
    fn gate_resumes_on_early_exit() {
        let channel = RecordingChannel::new();

        fn partial_sync(channel: &RecordingChannel, fail_fast: bool) {
            let _gate = ReactionGate::suspend(channel);
            if fail_fast {
                return;
            }
            emit(channel, SyncEvent::Temperature(0.5));
        }

        partial_sync(&channel, true);
        let kinds = channel.kinds();
        assert_eq!(kinds, vec!["allow_reactions", "allow_reactions"]);

        let events = channel.events.lock().unwrap();
        assert_eq!(events[0].1["value"], false);
        assert_eq!(events[1].1["value"], true);
    }

    #[test]
    fn gate_resumes_during_unwind() {
        let channel = RecordingChannel::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _gate = ReactionGate::suspend(&channel);
            panic!("mid-broadcast failure");
        }));
        assert!(result.is_err());

        let kinds = channel.kinds();
        assert_eq!(kinds, vec!["allow_reactions", "allow_reactions"]);
        assert_eq!(channel.events.lock().unwrap()[1].1["value"], true);
    }

    #[test]
    fn broadcast_reflects_current_store_values() {
        let channel = RecordingChannel::new();
        let mut session = Session::default();
        session.settings.set_format_option(
            crate::fields::FormatOption::SingleLine,
            true,
        );

        broadcast_all(&channel, &session);

        let events = channel.events.lock().unwrap();
        let single_line = events
            .iter()
            .find(|(_, payload, _)| payload["kind"] == "single_line")
            .expect("single_line event present");
        assert_eq!(single_line.1["value"], true);
    }
}

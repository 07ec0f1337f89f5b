//! Core types for the storyloom settings system.
//!
//! This crate holds the plain domain types shared between the session core
//! and the sync protocol: newline handling modes, model family tags, the
//! sampler preset record, and the hard-coded system defaults every session
//! starts from. No I/O, no state, only types and constants.

mod model;
mod preset;
mod types;

pub use model::{BackendCapabilities, ModelFamily, FAIRSEQ_COMPAT_MARKER};
pub use preset::{SamplerPreset, SystemDefaults};
pub use types::{BadWordIds, NewlineMode, LEGACY_SAMPLER_STAGE, SAMPLER_STAGE_COUNT};

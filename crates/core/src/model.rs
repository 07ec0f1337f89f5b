//! Model family tags and backend capability flags.

use serde::{Deserialize, Serialize};

/// Declared architecture family of a loaded model.
///
/// Only the families that change settings semantics are named; everything
/// else collapses into [`ModelFamily::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Requires sentence-boundary-token newline handling.
    Xglm,
    /// Trained with literal newline tokens in the corpus.
    Opt,
    /// Trained with literal newline tokens in the corpus.
    Bloom,
    /// No family-specific overrides.
    #[default]
    #[serde(other)]
    Generic,
}

impl ModelFamily {
    /// True for families whose corpus embeds literal newline tokens.
    pub fn preserves_newlines(&self) -> bool {
        matches!(self, ModelFamily::Opt | ModelFamily::Bloom)
    }
}

/// Legacy `compat` marker that forces sentence-boundary newline handling
/// even when the family tag alone would not.
pub const FAIRSEQ_COMPAT_MARKER: &str = "fairseq_lm";

/// What the active generation backend can do.
///
/// Remote/hosted backends expose only a reduced tuning surface; new
/// backends declare what they support instead of being matched by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendCapabilities {
    /// The full local sampler panel (top-k, tail-free, repetition penalty,
    /// sequence counts, …) is meaningful for this backend. When false only
    /// temperature, top-p and the remote generation amount are synced.
    pub local_tuning: bool,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self { local_tuning: true }
    }
}

//! Error type for settings resolution.
//!
//! Absence is not failure here: a missing persisted file, a missing
//! `config.json` candidate or a missing structured-override key never
//! produces an error. What does: a required simple key absent from the
//! effective model config, a value of the wrong shape, or a document that
//! exists but fails to parse.

/// Errors that can occur while resolving settings.
#[derive(Debug)]
pub enum SettingsError {
    /// A required simple key is absent from the effective model config.
    MissingKey(&'static str),
    /// A key is present but its value has the wrong shape.
    InvalidValue { key: String, detail: String },
    /// A persisted settings file or config.json exists but failed to parse.
    Malformed { path: String, detail: String },
    /// An I/O failure other than "file not found".
    Io { path: String, detail: String },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::MissingKey(key) => {
                write!(f, "Model config is missing required key '{}'", key)
            }
            SettingsError::InvalidValue { key, detail } => {
                write!(f, "Invalid value for '{}': {}", key, detail)
            }
            SettingsError::Malformed { path, detail } => {
                write!(f, "Malformed document {}: {}", path, detail)
            }
            SettingsError::Io { path, detail } => {
                write!(f, "I/O error reading {}: {}", path, detail)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_key() {
        let err = SettingsError::MissingKey("temp");
        assert!(err.to_string().contains("'temp'"));

        let err = SettingsError::InvalidValue {
            key: "sampler_order".to_string(),
            detail: "expected an array of stage ids".to_string(),
        };
        assert!(err.to_string().contains("sampler_order"));
    }
}

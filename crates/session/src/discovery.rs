//! Model config discovery.
//!
//! When a model does not carry its own configuration, resolution probes an
//! ordered list of candidate `config.json` locations. Missing candidates
//! are skipped; the first file that exists wins. A candidate that exists
//! but does not parse fails the whole discovery, it is not skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::model::ConfigMap;

/// Try candidates in order; the first present result wins.
///
/// Each candidate distinguishes "nothing there" (`Ok(None)`, try the next)
/// from failure (`Err`, stop immediately).
pub fn first_present<T, E, I>(candidates: I) -> Result<Option<T>, E>
where
    I: IntoIterator,
    I::Item: FnOnce() -> Result<Option<T>, E>,
{
    for candidate in candidates {
        if let Some(found) = candidate()? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Candidate `config.json` locations for a custom model directory: the raw
/// path first, then the path with separators flattened to underscores.
pub fn config_candidates(custom_dir: &str) -> Vec<PathBuf> {
    let flattened = custom_dir.replace(['/', '\\'], "_");

    let mut dirs = vec![custom_dir.to_string()];
    if flattened != custom_dir {
        dirs.push(flattened);
    }
    dirs.into_iter()
        .map(|dir| Path::new(&dir).join("config.json"))
        .collect()
}

/// Read and parse a JSON config mapping, treating "not found" as absence.
pub fn read_optional_config(path: &Path) -> Result<Option<ConfigMap>, SettingsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SettingsError::Io {
                path: path.display().to_string(),
                detail: e.to_string(),
            })
        }
    };

    serde_json::from_str::<ConfigMap>(&text)
        .map(Some)
        .map_err(|e| SettingsError::Malformed {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
}

/// Probe the candidate directories for a model config.
pub fn discover_model_config(custom_dir: &str) -> Result<Option<ConfigMap>, SettingsError> {
    let found = first_present(
        config_candidates(custom_dir)
            .into_iter()
            .map(|path| move || read_optional_config(&path)),
    )?;

    if found.is_none() {
        log::debug!("no config.json found under '{}'", custom_dir);
    }
    Ok(found)
}

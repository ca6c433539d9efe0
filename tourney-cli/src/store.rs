//! Reading and writing saved sessions as pretty-printed JSON.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tourney_core::SavedSession;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_session(path: &Path) -> Result<SavedSession, StoreError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| StoreError::Format { path: path.to_path_buf(), source })
}

/// Write through a sibling temp file so an interrupted save never truncates
/// the previous session.
pub fn save_session(path: &Path, saved: &SavedSession) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(saved)
        .map_err(|source| StoreError::Format { path: path.to_path_buf(), source })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .map_err(|source| StoreError::Write { path: tmp.clone(), source })?;
    std::fs::rename(&tmp, path)
        .map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;

    tracing::debug!(path = %path.display(), "session saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_core::RankingSession;

    #[test]
    fn test_save_then_load_restores_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut session = RankingSession::with_seed(12);
        session.start_run(["Tea", "Coffee", "Cocoa", "Juice"]);
        session.choose_first().unwrap();
        let saved = session.to_saved();

        save_session(&path, &saved).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_session(&path).unwrap(), saved);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_session(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[test]
    fn test_load_garbage_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_session(&path).unwrap_err(), StoreError::Format { .. }));
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{ "unranked": ["a", "b"] }"#).unwrap();

        let saved = load_session(&path).unwrap();
        assert_eq!(saved.unranked, vec!["a", "b"]);
        assert!(saved.ranked.is_empty());
        assert!(saved.memo.is_empty());
        assert!(saved.tier.is_none());

        let session = RankingSession::from_saved(saved).unwrap();
        let (first, second) = session.current_pair().unwrap();
        let mut pair = [first.as_str(), second.as_str()];
        pair.sort();
        assert_eq!(pair, ["a", "b"]);
    }
}

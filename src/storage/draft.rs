//! Saved proposal draft
//!
//! Loaded when a draft action starts, cleared once its proposal has been
//! submitted.

use crate::core::Draft;
use crate::storage::persistence::{load_json, remove_file, save_json, StorageError};
use chrono::Utc;
use std::path::{Path, PathBuf};

const DRAFT_FILE: &str = "draft.json";

/// File-backed store for the single pending draft
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    /// Store the draft inside `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(DRAFT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved draft, or the blank form if none was saved
    pub fn load(&self) -> Result<Draft, StorageError> {
        Ok(load_json(&self.path)?.unwrap_or_default())
    }

    /// Save `draft`, stamping the save time
    pub fn save(&self, draft: &mut Draft) -> Result<(), StorageError> {
        draft.saved_at = Some(Utc::now());
        save_json(draft, &self.path)
    }

    /// Reset to the blank form
    pub fn clear(&self) -> Result<(), StorageError> {
        remove_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DraftMethod;

    #[test]
    fn test_missing_draft_loads_blank_form() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(temp_dir.path());
        assert_eq!(store.load().unwrap(), Draft::default());
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(temp_dir.path());

        let mut draft = Draft {
            method_name: DraftMethod::RemoveSigner,
            signer: "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc".to_string(),
            new_signatures_number: "1".to_string(),
            ..Default::default()
        };
        store.save(&mut draft).unwrap();
        assert!(draft.saved_at.is_some());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, draft);

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }
}

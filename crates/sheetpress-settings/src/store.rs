// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings store — the layout blob under one well-known file name, plus the
// export configuration.
//
// Writes go to a sibling temporary file that is then renamed over the target,
// so readers see either the previous blob or the new one. Concurrent writers
// are not arbitrated: the last rename wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sheetpress_core::error::{Result, SheetpressError};
use sheetpress_core::{ExportConfig, LayoutModel, ResetRequested};
use tracing::{debug, info, instrument, warn};

use crate::codec;

/// File name of the persisted layout blob.
pub const SETTINGS_FILE: &str = "layoutSettings.json";

/// File name of the persisted export configuration.
pub const CONFIG_FILE: &str = "config.json";

/// Durable home of the layout blob.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store the blob as [`SETTINGS_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved layout. `Ok(None)` means nothing has been saved.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<LayoutModel>> {
        let blob = match std::fs::read_to_string(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no saved layout");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let model = codec::deserialize(&blob)?;
        info!(images = model.image_blobs().len(), "saved layout loaded");
        Ok(Some(model))
    }

    /// Load the saved layout, falling back to an empty one when there is none
    /// or it cannot be read.
    pub fn load_or_default(&self) -> LayoutModel {
        match self.load() {
            Ok(Some(model)) => model,
            Ok(None) => LayoutModel::new(),
            Err(e) => {
                warn!(error = %e, "saved layout unreadable, starting from an empty layout");
                LayoutModel::new()
            }
        }
    }

    /// Persist `model`, replacing any previous blob.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, model: &LayoutModel) -> Result<()> {
        let blob = codec::serialize(model)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, blob.as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        info!(bytes = blob.len(), "layout saved");
        Ok(())
    }

    /// Delete the persisted blob. Deleting a missing blob is not an error.
    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "saved layout deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Complete a [`LayoutModel::reset_all`] by deleting the persisted blob.
    pub fn apply_reset(&self, _reset: ResetRequested) -> Result<()> {
        self.delete()
    }
}

// -- Config file persistence -------------------------------------------------

/// Load `config.json` from `data_dir`, or defaults if it is missing or
/// unreadable.
pub fn load_config(data_dir: &Path) -> ExportConfig {
    let path = data_dir.join(CONFIG_FILE);
    let Ok(data) = std::fs::read_to_string(&path) else {
        return ExportConfig::default();
    };
    match serde_json::from_str::<ExportConfig>(&data)
        .map_err(SheetpressError::from)
        .and_then(|config| config.validate().map(|()| config))
    {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            ExportConfig::default()
        }
    }
}

pub fn save_config(data_dir: &Path, config: &ExportConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetpress_core::{FieldName, ImageBlob, PageTemplate, Position};

    fn model() -> LayoutModel {
        let mut m = LayoutModel::new();
        m.set_field_position(
            FieldName::new("name").expect("name"),
            Position { x: 20.0, y: 30.0 },
        )
        .expect("pos");
        m.add_image(ImageBlob::new("image/png", vec![1, 2, 3])).expect("add image");
        m
    }

    #[test]
    fn missing_blob_means_no_saved_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::in_dir(dir.path());
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::in_dir(dir.path());
        let m = model();
        store.save(&m).expect("save");
        assert_eq!(store.load().expect("load"), Some(m));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn last_save_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::in_dir(dir.path());
        store.save(&model()).expect("first save");
        let empty = LayoutModel::new();
        store.save(&empty).expect("second save");
        assert_eq!(store.load().expect("load"), Some(empty));
    }

    #[test]
    fn reset_deletes_the_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::in_dir(dir.path());
        let mut m = model();
        store.save(&m).expect("save");

        let reset = m.reset_all();
        store.apply_reset(reset).expect("reset");

        assert!(m.is_empty());
        assert!(store.load().expect("load").is_none());
        // A second delete is harmless.
        store.delete().expect("delete again");
    }

    #[test]
    fn corrupt_blob_falls_back_to_empty_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::in_dir(dir.path());
        std::fs::write(store.path(), "{{{").expect("write");
        assert!(store.load().is_err());
        assert!(store.load_or_default().is_empty());
    }

    #[test]
    fn config_round_trip_and_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_config(dir.path()), ExportConfig::default());

        let config = ExportConfig {
            page: PageTemplate::a4(),
            default_font_family: "Amiri".into(),
            ..ExportConfig::default()
        };
        save_config(dir.path(), &config).expect("save");
        assert_eq!(load_config(dir.path()), config);
    }

    #[test]
    fn invalid_config_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"page":{"width_px":0,"height_px":100}}"#,
        )
        .expect("write");
        assert_eq!(load_config(dir.path()), ExportConfig::default());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session — the data directory, the saved layout and the export
// configuration, opened once per invocation.

use std::path::{Path, PathBuf};

use sheetpress_core::error::Result;
use sheetpress_core::{ExportConfig, LayoutModel};
use sheetpress_settings::{SettingsStore, data_dir, load_config, save_config};
use tracing::info;

pub struct Session {
    data_dir: PathBuf,
    store: SettingsStore,
    config: ExportConfig,
}

impl Session {
    /// Open the session in `dir`, or in the default data directory.
    pub fn open(dir: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                dir
            }
            None => data_dir()?,
        };
        info!(path = %dir.display(), "session opened");

        let config = load_config(&dir);
        Ok(Self {
            store: SettingsStore::in_dir(&dir),
            data_dir: dir,
            config,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Persist a new configuration and use it for the rest of the session.
    pub fn update_config(&mut self, config: ExportConfig) -> Result<()> {
        save_config(&self.data_dir, &config)?;
        self.config = config;
        Ok(())
    }

    /// The saved layout, or an empty one when nothing usable is saved.
    pub fn layout(&self) -> LayoutModel {
        self.store.load_or_default()
    }

    /// The saved layout as a starting point for an edit. Unlike
    /// [`Session::layout`], an unreadable blob is an error, so saving the
    /// edited model can never replace it with an otherwise empty layout.
    pub fn saved_layout(&self) -> Result<LayoutModel> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    pub fn layout_path(&self) -> &Path {
        self.store.path()
    }

    pub fn save_layout(&self, model: &LayoutModel) -> Result<()> {
        self.store.save(model)
    }

    /// Clear `model` and delete the saved layout.
    pub fn reset_layout(&self, model: &mut LayoutModel) -> Result<()> {
        let reset = model.reset_all();
        self.store.apply_reset(reset)
    }
}

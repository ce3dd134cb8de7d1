// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sheetpress-settings — Persisting the layout model.
//
// The codec turns a `LayoutModel` (including its image blobs) into a single
// JSON blob and back, tolerating missing or damaged keys. The store keeps that
// blob, and the export configuration, in the data directory.

pub mod codec;
pub mod data_dir;
pub mod store;

pub use codec::{deserialize, serialize};
pub use data_dir::data_dir;
pub use store::{SettingsStore, load_config, save_config};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::PathBuf;

use sheetpress_core::error::Result;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SHEETPRESS_DATA_DIR";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(explicit) => PathBuf::from(explicit),
        None => base_dir().join("sheetpress"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn base_dir() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}

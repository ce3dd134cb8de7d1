// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheetpress — Core types, layout model, and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod layout;
pub mod types;

pub use config::ExportConfig;
pub use error::SheetpressError;
pub use layout::{LayoutModel, ResetRequested, RotationEdit, Selection};
pub use types::*;

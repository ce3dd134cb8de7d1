// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Sheetpress.

use thiserror::Error;

/// Top-level error type for all Sheetpress operations.
#[derive(Debug, Error)]
pub enum SheetpressError {
    // -- Import errors --
    #[error("spreadsheet could not be read: {0}")]
    ImportFormat(String),

    #[error("export requested with zero data rows")]
    EmptyDataset,

    // -- Layout model --
    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),

    #[error("invalid layout value: {0}")]
    InvalidLayout(String),

    // -- Rendering --
    #[error("value {value:?} cannot be encoded as a barcode: {reason}")]
    BarcodeEncoding { value: String, reason: String },

    #[error("font {family:?} could not be registered: {reason}")]
    FontRegistration { family: String, reason: String },

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Storage / persistence --
    #[error("layout settings are unreadable: {0}")]
    Settings(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SheetpressError>;

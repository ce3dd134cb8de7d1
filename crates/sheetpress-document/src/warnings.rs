// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recovered export problems, reported alongside the finished document.

use sheetpress_core::SheetpressError;

/// A problem that was recovered with a fallback during export.
///
/// The document is still complete; the warning tells the user which page
/// differs from the layout so the source data can be fixed.
#[derive(Debug)]
pub struct ExportWarning {
    /// Zero-based data row (= page) the problem occurred on, if page specific.
    pub row: Option<usize>,
    pub error: SheetpressError,
}

impl ExportWarning {
    pub fn document(error: SheetpressError) -> Self {
        Self { row: None, error }
    }

    pub fn on_row(row: usize, error: SheetpressError) -> Self {
        Self {
            row: Some(row),
            error,
        }
    }
}

impl std::fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "page {}: {}", row + 1, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

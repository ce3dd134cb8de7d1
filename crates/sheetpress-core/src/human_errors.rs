// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the caller whether a document was still produced.

use crate::error::SheetpressError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing was exported; the user must fix something first.
    Fatal,
    /// The document was produced, but part of one page looks different from
    /// the layout (a fallback was used).
    Recovered,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `SheetpressError` into a `HumanError`.
pub fn humanize_error(err: &SheetpressError) -> HumanError {
    match err {
        SheetpressError::ImportFormat(detail) => HumanError {
            message: "We couldn't read that spreadsheet.".into(),
            suggestion: format!(
                "Make sure the file is an Excel or OpenDocument spreadsheet and try again. ({detail})"
            ),
            severity: Severity::Fatal,
        },

        SheetpressError::EmptyDataset => HumanError {
            message: "There are no rows to export.".into(),
            suggestion: "Import a spreadsheet with at least one data row below the header row."
                .into(),
            severity: Severity::Fatal,
        },

        SheetpressError::InvalidFieldName(name) => HumanError {
            message: "A column has an unusable name.".into(),
            suggestion: format!("Give the column a visible header instead of {name:?}."),
            severity: Severity::Fatal,
        },

        SheetpressError::InvalidLayout(detail) => HumanError {
            message: "That layout value isn't allowed.".into(),
            suggestion: format!("Sizes must be positive and positions must be numbers. ({detail})"),
            severity: Severity::Fatal,
        },

        SheetpressError::BarcodeEncoding { value, .. } => HumanError {
            message: format!("{value:?} couldn't be drawn as a barcode, so it was printed as text."),
            suggestion: "Barcodes accept plain letters, digits, spaces and punctuation. Fix the cell and export again."
                .into(),
            severity: Severity::Recovered,
        },

        SheetpressError::FontRegistration { family, .. } => HumanError {
            message: format!("The font {family:?} couldn't be used, so the default font was used instead."),
            suggestion: "Check that the font file is a TrueType or OpenType font.".into(),
            severity: Severity::Recovered,
        },

        SheetpressError::ImageError(detail) => HumanError {
            message: "One of the images couldn't be drawn.".into(),
            suggestion: format!("Try re-adding the image as a PNG or JPEG. ({detail})"),
            severity: Severity::Recovered,
        },

        SheetpressError::PdfError(detail) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: format!("Nothing was saved. Please try again. ({detail})"),
            severity: Severity::Fatal,
        },

        SheetpressError::Settings(detail) => HumanError {
            message: "The saved layout couldn't be read.".into(),
            suggestion: format!("Reset the layout to start fresh. ({detail})"),
            severity: Severity::Fatal,
        },

        SheetpressError::Io(e) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the path and that you have permission to use it. ({e})"),
            severity: Severity::Fatal,
        },

        SheetpressError::Serialization(e) => HumanError {
            message: "Some data was in an unexpected format.".into(),
            suggestion: format!("Reset the layout or re-save the file. ({e})"),
            severity: Severity::Fatal,
        },
    }
}

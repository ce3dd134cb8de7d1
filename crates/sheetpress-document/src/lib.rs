// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sheetpress-document — Turning rows and a layout into a PDF.
//
// Provides spreadsheet import (first sheet only), Code 128 barcode
// rasterization, custom font embedding, overlay image preparation, the
// per-row page renderer, the document exporter, and read-back inspection of
// produced PDFs.

pub mod barcode;
pub mod export;
pub mod fonts;
pub mod import;
pub mod inspect;
pub mod overlay;
pub mod render;
pub mod warnings;

// Re-export the primary structs so callers can use `sheetpress_document::DocumentExporter` etc.
pub use barcode::BarcodeRaster;
pub use export::{DocumentExporter, ExportOutput};
pub use fonts::{FontRegistrar, FontSource};
pub use import::{dataset_from_range, import_file, import_spreadsheet};
pub use inspect::{PageSummary, PdfInspector};
pub use render::{PageRenderer, PageSurface};
pub use warnings::ExportWarning;

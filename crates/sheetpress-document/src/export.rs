// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document exporter — one page per data row, all pages sharing the layout.
//
// Shared resources (fonts, overlay images) are embedded once per document and
// referenced from every page. The rendering loop owns a single "current" page
// surface: the first row draws onto the page the document starts with, every
// later row first finishes the current page and starts a new one. That keeps
// page count equal to row count with no leading or trailing blank page.

use std::path::Path;

use printpdf::{PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg};
use sheetpress_core::error::{Result, SheetpressError};
use sheetpress_core::{Dataset, ExportConfig, LayoutModel};
use tracing::{debug, info, instrument};

use crate::fonts::{FontRegistrar, FontSource};
use crate::overlay;
use crate::render::{PageRenderer, PageSurface};
use crate::warnings::ExportWarning;

/// A finished export.
#[derive(Debug)]
pub struct ExportOutput {
    /// Serialized PDF.
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Problems recovered from during export, in the order they occurred.
    pub warnings: Vec<ExportWarning>,
}

/// Produces PDFs from a dataset and a layout.
///
/// The configuration and custom fonts are fixed for the lifetime of the
/// exporter; each [`DocumentExporter::export`] call builds an independent
/// document.
pub struct DocumentExporter {
    config: ExportConfig,
    fonts: Vec<FontSource>,
}

impl DocumentExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            fonts: Vec::new(),
        }
    }

    /// Add font programs to embed in every exported document.
    pub fn with_fonts(mut self, fonts: impl IntoIterator<Item = FontSource>) -> Self {
        self.fonts.extend(fonts);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render every row of `dataset` onto its own page, in dataset order.
    ///
    /// Fails with [`SheetpressError::EmptyDataset`] when there are no rows.
    /// Unencodable barcodes, unreadable overlay images and unknown fonts are
    /// recovered from and reported in [`ExportOutput::warnings`].
    #[instrument(skip_all, fields(rows = dataset.rows().len(), images = model.image_blobs().len()))]
    pub fn export(&self, dataset: &Dataset, model: &LayoutModel) -> Result<ExportOutput> {
        if !dataset.is_ready() {
            return Err(SheetpressError::EmptyDataset);
        }

        let page = self.config.page;
        info!(
            width_px = page.width_px,
            height_px = page.height_px,
            title = %self.config.title,
            "Exporting dataset"
        );

        let mut doc = PdfDocument::new(&self.config.title);
        let mut warnings = Vec::new();

        let fonts = FontRegistrar::register(
            &mut doc,
            &self.fonts,
            &self.config.default_font_family,
            &mut warnings,
        );
        let overlays = overlay::prepare(&mut doc, model, &mut warnings);
        let mut renderer =
            PageRenderer::new(&self.config, dataset.headers(), model, &overlays, fonts);

        let mut pages: Vec<PdfPage> = Vec::with_capacity(dataset.rows().len());
        let mut surface = PageSurface::new();
        for (row_index, row) in dataset.rows().iter().enumerate() {
            if row_index > 0 {
                let finished = std::mem::take(&mut surface);
                pages.push(finished.into_page(&page));
            }
            renderer.render(&mut doc, row_index, row, &mut surface, &mut warnings);
        }
        pages.push(surface.into_page(&page));

        if pages.len() != dataset.rows().len() {
            return Err(SheetpressError::PdfError(format!(
                "{} pages produced for {} rows",
                pages.len(),
                dataset.rows().len()
            )));
        }
        let page_count = pages.len();
        doc.with_pages(pages);

        let mut save_warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut save_warnings);
        debug!(
            pages = page_count,
            bytes = bytes.len(),
            pdf_warnings = save_warnings.len(),
            recovered = warnings.len(),
            "PDF serialized"
        );

        Ok(ExportOutput {
            bytes,
            page_count,
            warnings,
        })
    }

    /// Export and write the document to `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn export_to_file(
        &self,
        dataset: &Dataset,
        model: &LayoutModel,
        path: impl AsRef<Path>,
    ) -> Result<ExportOutput> {
        let output = self.export(dataset, model)?;
        std::fs::write(path.as_ref(), &output.bytes)?;
        info!(bytes = output.bytes.len(), "PDF written");
        Ok(output)
    }
}

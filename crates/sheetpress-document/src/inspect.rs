// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspector — read back an exported document with `lopdf` to check page
// count, page geometry, and what each page draws.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use sheetpress_core::error::{Result, SheetpressError};
use tracing::{debug, instrument};

/// Read-only view over a parsed PDF.
pub struct PdfInspector {
    document: Document,
}

/// What a single page draws.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub number: u32,
    pub text_draws: usize,
    pub image_draws: usize,
}

impl PdfInspector {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            SheetpressError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;
        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            SheetpressError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;
        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Number of text-showing operators (`Tj`, `TJ`) on a 1-indexed page.
    pub fn text_draws(&self, page_number: u32) -> Result<usize> {
        self.count_operators(page_number, &["Tj", "TJ"])
    }

    /// Number of XObject draws (`Do`) on a 1-indexed page.
    pub fn image_draws(&self, page_number: u32) -> Result<usize> {
        self.count_operators(page_number, &["Do"])
    }

    /// Concatenated string operands of the page's text operators, one line
    /// per operator. Only meaningful for text set in the standard fonts.
    pub fn page_text(&self, page_number: u32) -> Result<String> {
        let content = self.page_content(page_number)?;
        let mut lines = Vec::new();
        for op in &content.operations {
            match op.operator.as_str() {
                "Tj" => lines.push(strings_of(&op.operands)),
                "TJ" => {
                    let parts = op
                        .operands
                        .iter()
                        .filter_map(|o| o.as_array().ok())
                        .map(|items| strings_of(items))
                        .collect::<String>();
                    lines.push(parts);
                }
                _ => {}
            }
        }
        Ok(lines.join("\n"))
    }

    /// MediaBox width and height of a 1-indexed page, in points.
    pub fn page_size_pt(&self, page_number: u32) -> Result<(f32, f32)> {
        let id = self.page_id(page_number)?;
        let media_box = self
            .document
            .get_dictionary(id)
            .and_then(|page| page.get(b"MediaBox"))
            .and_then(Object::as_array)
            .map_err(|err| {
                SheetpressError::PdfError(format!("page {page_number} has no MediaBox: {err}"))
            })?;

        let coords: Vec<f32> = media_box.iter().filter_map(number).collect();
        match coords.as_slice() {
            [x0, y0, x1, y1] => Ok((x1 - x0, y1 - y0)),
            _ => Err(SheetpressError::PdfError(format!(
                "page {page_number} has a malformed MediaBox"
            ))),
        }
    }

    /// Number of image XObjects stored in the document.
    pub fn image_xobject_count(&self) -> usize {
        self.document
            .objects
            .values()
            .filter_map(|obj| obj.as_stream().ok())
            .filter(|stream| {
                stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|name| name == b"Image")
            })
            .count()
    }

    /// Number of font programs embedded in the document (one descriptor each;
    /// the standard fonts have none).
    pub fn embedded_font_count(&self) -> usize {
        self.document
            .objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|dict| {
                dict.get(b"Type")
                    .and_then(Object::as_name)
                    .is_ok_and(|name| name == b"FontDescriptor")
            })
            .count()
    }

    /// Per-page draw counts for every page, in page order.
    pub fn summarize(&self) -> Result<Vec<PageSummary>> {
        let pages = self.document.get_pages();
        let mut summaries = Vec::with_capacity(pages.len());
        for &number in pages.keys() {
            summaries.push(PageSummary {
                number,
                text_draws: self.text_draws(number)?,
                image_draws: self.image_draws(number)?,
            });
        }
        Ok(summaries)
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            SheetpressError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    fn page_content(&self, page_number: u32) -> Result<Content> {
        let id = self.page_id(page_number)?;
        let raw = self.document.get_page_content(id).map_err(|err| {
            SheetpressError::PdfError(format!("page {page_number} content unreadable: {err}"))
        })?;
        Content::decode(&raw).map_err(|err| {
            SheetpressError::PdfError(format!("page {page_number} content undecodable: {err}"))
        })
    }

    fn count_operators(&self, page_number: u32, operators: &[&str]) -> Result<usize> {
        let content = self.page_content(page_number)?;
        Ok(content
            .operations
            .iter()
            .filter(|op| operators.contains(&op.operator.as_str()))
            .count())
    }
}

fn strings_of(operands: &[Object]) -> String {
    operands
        .iter()
        .filter_map(|o| match o {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_a_pdf_error() {
        assert!(matches!(
            PdfInspector::from_bytes(b"not a pdf"),
            Err(SheetpressError::PdfError(_))
        ));
    }

    #[test]
    fn missing_file_is_a_pdf_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(PdfInspector::open(dir.path().join("absent.pdf")).is_err());
    }
}

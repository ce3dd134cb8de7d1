// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `sheetpress inspect` — page count and per-page draw counts of a PDF.

use std::path::Path;

use anyhow::{Context, Result};
use sheetpress_document::PdfInspector;

pub fn run(file: &Path) -> Result<()> {
    let pdf = PdfInspector::open(file).with_context(|| format!("opening {}", file.display()))?;

    println!("{}: {} page(s)", file.display(), pdf.page_count());
    for page in pdf.summarize()? {
        let (width, height) = pdf.page_size_pt(page.number)?;
        println!(
            "  Page {}: {:.2} x {:.2} pt, {} text, {} image(s)",
            page.number, width, height, page.text_draws, page.image_draws
        );
    }
    println!("  Embedded images: {}", pdf.image_xobject_count());
    Ok(())
}

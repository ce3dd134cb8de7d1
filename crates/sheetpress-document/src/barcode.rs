// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode rasterizer — Code 128 (character set B) via `barcoders`, drawn into
// an 8-bit grayscale bitmap with `imageproc`.
//
// The raster has a fixed resolution; the renderer scales it into the barcode
// box of the layout, so the bitmap only needs to be sharp, not page-sized.

use std::io::Cursor;

use barcoders::sym::code128::Code128;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use printpdf::{RawImage, RawImageData, RawImageFormat};
use sheetpress_core::error::{Result, SheetpressError};
use tracing::{debug, instrument};

/// Code 128 start character selecting character set B.
const CHARSET_B: char = '\u{0181}';

/// Width of one bar module in raster pixels.
pub const MODULE_PX: u32 = 2;

/// Blank modules on each side of the symbol.
pub const QUIET_ZONE_MODULES: u32 = 10;

/// Height of the raster in pixels.
pub const RASTER_HEIGHT_PX: u32 = 100;

/// A rasterized barcode: black bars on a white background.
#[derive(Debug, Clone)]
pub struct BarcodeRaster {
    image: GrayImage,
}

impl BarcodeRaster {
    /// Encode `value` as Code 128 and rasterize it.
    ///
    /// Only printable ASCII (space through `~`) is accepted; anything else is
    /// a [`SheetpressError::BarcodeEncoding`].
    #[instrument(level = "debug")]
    pub fn encode(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(encoding_error(value, "value is empty"));
        }
        if let Some(bad) = value.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(encoding_error(
                value,
                format!("character {bad:?} is outside Code 128 set B"),
            ));
        }

        let symbol = Code128::new(format!("{CHARSET_B}{value}"))
            .map_err(|e| encoding_error(value, e.to_string()))?;
        let modules = symbol.encode();

        let image = draw_modules(&modules);
        debug!(
            modules = modules.len(),
            width = image.width(),
            "barcode rasterized"
        );
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// PNG encoding of the raster.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(self.image.clone())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| SheetpressError::ImageError(format!("PNG encoding error: {e}")))?;
        Ok(buf)
    }

    /// Single-channel image data for embedding in the PDF.
    pub fn to_raw_image(&self) -> RawImage {
        RawImage {
            pixels: RawImageData::U8(self.image.as_raw().clone()),
            width: self.image.width() as usize,
            height: self.image.height() as usize,
            data_format: RawImageFormat::R8,
            tag: Vec::new(),
        }
    }
}

fn encoding_error(value: &str, reason: impl Into<String>) -> SheetpressError {
    SheetpressError::BarcodeEncoding {
        value: value.to_owned(),
        reason: reason.into(),
    }
}

/// Paint runs of dark modules (`1`) as filled bars.
fn draw_modules(modules: &[u8]) -> GrayImage {
    let total_modules = modules.len() as u32 + 2 * QUIET_ZONE_MODULES;
    let mut image = GrayImage::from_pixel(
        total_modules * MODULE_PX,
        RASTER_HEIGHT_PX,
        Luma([255u8]),
    );

    let mut i = 0;
    while i < modules.len() {
        if modules[i] == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < modules.len() && modules[i] != 0 {
            i += 1;
        }
        let x = (QUIET_ZONE_MODULES + start as u32) * MODULE_PX;
        let width = (i - start) as u32 * MODULE_PX;
        draw_filled_rect_mut(
            &mut image,
            Rect::at(x as i32, 0).of_size(width, RASTER_HEIGHT_PX),
            Luma([0u8]),
        );
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_encode() {
        let raster = BarcodeRaster::encode("12345").expect("encode");
        assert_eq!(raster.height(), RASTER_HEIGHT_PX);
        assert_eq!(raster.width() % MODULE_PX, 0);

        // Quiet zone is white, the first bar (start character) is black.
        let quiet = QUIET_ZONE_MODULES * MODULE_PX;
        assert_eq!(raster.as_gray().get_pixel(0, 0).0[0], 255);
        assert_eq!(raster.as_gray().get_pixel(quiet - 1, 50).0[0], 255);
        assert_eq!(raster.as_gray().get_pixel(quiet, 50).0[0], 0);
        assert_eq!(raster.as_gray().get_pixel(raster.width() - 1, 50).0[0], 255);
    }

    #[test]
    fn longer_values_give_wider_rasters() {
        let short = BarcodeRaster::encode("A1").expect("short");
        let long = BarcodeRaster::encode("A1-B2-C3-D4").expect("long");
        assert!(long.width() > short.width());
    }

    #[test]
    fn non_ascii_is_rejected() {
        match BarcodeRaster::encode("café") {
            Err(SheetpressError::BarcodeEncoding { value, .. }) => assert_eq!(value, "café"),
            other => panic!("expected BarcodeEncoding, got {other:?}"),
        }
        assert!(BarcodeRaster::encode("tab\there").is_err());
        assert!(BarcodeRaster::encode("").is_err());
    }

    #[test]
    fn png_decodes_to_the_same_dimensions() {
        let raster = BarcodeRaster::encode("SKU-42").expect("encode");
        let png = raster.to_png().expect("png");
        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!(decoded.width(), raster.width());
        assert_eq!(decoded.height(), raster.height());
    }

    #[test]
    fn raw_image_is_single_channel() {
        let raster = BarcodeRaster::encode("7").expect("encode");
        let raw = raster.to_raw_image();
        assert_eq!(raw.width, raster.width() as usize);
        match raw.pixels {
            RawImageData::U8(px) => {
                assert_eq!(px.len(), (raster.width() * raster.height()) as usize)
            }
            _ => panic!("expected 8-bit pixels"),
        }
    }
}

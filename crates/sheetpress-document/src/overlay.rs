// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay images — identifying uploaded image bytes, decoding them, and
// embedding each one once per document so every page can reuse it.

use image::{DynamicImage, ImageFormat};
use printpdf::{PdfDocument, RawImage, RawImageData, RawImageFormat, XObjectId};
use sheetpress_core::error::{Result, SheetpressError};
use sheetpress_core::{ImageBlob, ImageIndex, LayoutModel};
use tracing::{debug, instrument, warn};

use crate::warnings::ExportWarning;

/// Wrap freshly uploaded bytes in an [`ImageBlob`], detecting the format from
/// the content.
pub fn blob_from_bytes(bytes: Vec<u8>) -> Result<ImageBlob> {
    let format = image::guess_format(&bytes)
        .map_err(|e| SheetpressError::ImageError(format!("unrecognised image data: {e}")))?;
    Ok(ImageBlob::new(format.to_mime_type(), bytes))
}

/// Decode an image blob into pixel data printpdf can embed.
#[instrument(skip(blob), fields(mime = %blob.mime, bytes = blob.bytes.len()))]
pub fn decode(blob: &ImageBlob) -> Result<RawImage> {
    let format = ImageFormat::from_mime_type(&blob.mime);
    let decoded = match format {
        Some(format) => image::load_from_memory_with_format(&blob.bytes, format),
        None => image::load_from_memory(&blob.bytes),
    }
    .map_err(|e| SheetpressError::ImageError(format!("failed to decode image: {e}")))?;

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "overlay decoded"
    );
    Ok(to_raw_image(decoded))
}

fn to_raw_image(image: DynamicImage) -> RawImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    // Keep transparency only when the source has it.
    let (pixels, data_format) = if image.color().has_alpha() {
        (image.to_rgba8().into_raw(), RawImageFormat::RGBA8)
    } else {
        (image.to_rgb8().into_raw(), RawImageFormat::RGB8)
    };
    RawImage {
        pixels: RawImageData::U8(pixels),
        width,
        height,
        data_format,
        tag: Vec::new(),
    }
}

/// An overlay embedded in the document, ready to be placed on any page.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub index: ImageIndex,
    pub xobject: XObjectId,
    pub width_px: usize,
    pub height_px: usize,
}

/// Embed every image of `model` into `doc`, in ascending index order.
///
/// Images that fail to decode are left out and reported; the rest of the
/// document is unaffected.
pub fn prepare(
    doc: &mut PdfDocument,
    model: &LayoutModel,
    warnings: &mut Vec<ExportWarning>,
) -> Vec<Overlay> {
    let mut overlays = Vec::new();
    for (index, blob) in model.images() {
        match decode(blob) {
            Ok(raw) => {
                let (width_px, height_px) = (raw.width, raw.height);
                let xobject = doc.add_image(&raw);
                overlays.push(Overlay {
                    index,
                    xobject,
                    width_px,
                    height_px,
                });
            }
            Err(e) => {
                warn!(%index, error = %e, "overlay skipped");
                warnings.push(ExportWarning::document(SheetpressError::ImageError(format!(
                    "image {index} skipped: {e}"
                ))));
            }
        }
    }
    overlays
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn sniffs_png() {
        let blob = blob_from_bytes(png_bytes(4, 4)).expect("blob");
        assert_eq!(blob.mime, "image/png");
    }

    #[test]
    fn rejects_unknown_bytes() {
        assert!(blob_from_bytes(b"hello".to_vec()).is_err());
    }

    #[test]
    fn decode_keeps_dimensions_and_alpha() {
        let opaque = decode(&ImageBlob::new("image/png", png_bytes(3, 2))).expect("decode");
        assert_eq!((opaque.width, opaque.height), (3, 2));
        assert!(matches!(opaque.data_format, RawImageFormat::RGB8));

        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 128])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        let translucent = decode(&ImageBlob::new("image/png", buf)).expect("decode");
        assert!(matches!(translucent.data_format, RawImageFormat::RGBA8));
    }

    #[test]
    fn broken_images_are_skipped_not_fatal() {
        let mut model = LayoutModel::new();
        model.add_image(ImageBlob::new("image/png", png_bytes(2, 2))).expect("add image");
        model.add_image(ImageBlob::new("image/png", b"truncated".to_vec())).expect("add image");
        model.add_image(ImageBlob::new("image/png", png_bytes(5, 5))).expect("add image");

        let mut doc = PdfDocument::new("overlays");
        let mut warnings = Vec::new();
        let overlays = prepare(&mut doc, &model, &mut warnings);

        assert_eq!(
            overlays.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![ImageIndex(0), ImageIndex(2)]
        );
        assert_eq!(warnings.len(), 1);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderer — draws one data row onto one page surface.
//
// printpdf 0.8 pages are plain `Vec<Op>` lists, so a surface is just the ops
// accumulated for one page. Paint order per page:
//   1. overlay images, ascending index (later indices paint over earlier)
//   2. fields in header order: barcode image, or "<field>: <value>" text
//
// Layout coordinates are pixels from the top-left corner; PDF user space is
// points from the bottom-left. 1 px = 0.75 pt.

use std::collections::HashMap;

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, Point, Pt, TextItem, TextMatrix, XObjectId, XObjectTransform,
};
use sheetpress_core::{
    CellValue, ExportConfig, FieldName, FieldStyle, ImageSize, LayoutModel, PageTemplate,
    Position, Row,
};
use tracing::{debug, warn};

use crate::barcode::BarcodeRaster;
use crate::fonts::{FontRegistrar, ResolvedFont};
use crate::overlay::Overlay;
use crate::warnings::ExportWarning;

/// Images are embedded at 72 dpi so that one source pixel is one point
/// before scaling.
const IMAGE_DPI: f32 = 72.0;

/// The drawing operations of one page.
#[derive(Debug, Default)]
pub struct PageSurface {
    ops: Vec<Op>,
}

impl PageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Finish the surface as a page of the template's size.
    pub fn into_page(self, template: &PageTemplate) -> PdfPage {
        PdfPage::new(
            Mm::from(Pt(template.width_pt() as f32)),
            Mm::from(Pt(template.height_pt() as f32)),
            self.ops,
        )
    }
}

/// An embedded barcode image and its raster size.
#[derive(Debug, Clone)]
struct PlacedBarcode {
    xobject: XObjectId,
    width_px: usize,
    height_px: usize,
}

/// Draws rows using resources prepared once per document.
pub struct PageRenderer<'a> {
    config: &'a ExportConfig,
    headers: &'a [FieldName],
    model: &'a LayoutModel,
    overlays: &'a [Overlay],
    fonts: FontRegistrar,
    /// Barcodes already embedded, keyed by encoded value.
    barcodes: HashMap<String, PlacedBarcode>,
}

impl<'a> PageRenderer<'a> {
    pub fn new(
        config: &'a ExportConfig,
        headers: &'a [FieldName],
        model: &'a LayoutModel,
        overlays: &'a [Overlay],
        fonts: FontRegistrar,
    ) -> Self {
        Self {
            config,
            headers,
            model,
            overlays,
            fonts,
            barcodes: HashMap::new(),
        }
    }

    /// Draw `row` onto `surface`. Never inserts a page break.
    ///
    /// `row_index` is only used to attribute warnings to a page.
    pub fn render(
        &mut self,
        doc: &mut PdfDocument,
        row_index: usize,
        row: &Row,
        surface: &mut PageSurface,
        warnings: &mut Vec<ExportWarning>,
    ) {
        let page = self.config.page;

        for overlay in self.overlays {
            let position = self.model.image_position(overlay.index);
            let size = self.model.image_size(overlay.index);
            surface.ops.push(place_image(
                &page,
                overlay.xobject.clone(),
                (overlay.width_px, overlay.height_px),
                position,
                size,
            ));
        }

        for name in self.headers {
            let style = self.model.resolve_field(name, self.config);
            let value = row.get(name).cloned().unwrap_or(CellValue::Empty);

            if name.is_barcode() && !value.is_empty() {
                let text = value.to_string();
                match self.barcode(doc, &text) {
                    Ok(barcode) => {
                        // Barcodes ignore rotation and font.
                        surface.ops.push(place_image(
                            &page,
                            barcode.xobject,
                            (barcode.width_px, barcode.height_px),
                            style.position,
                            self.config.barcode_box,
                        ));
                        continue;
                    }
                    Err(e) => {
                        warn!(row = row_index, error = %e, "barcode drawn as text instead");
                        warnings.push(ExportWarning::on_row(row_index, e));
                    }
                }
            }

            let font = self.fonts.resolve(&style.font.family, warnings);
            let text = format!("{name}: {value}");
            draw_text(surface, &page, &style, &font, text);
        }

        debug!(row = row_index, ops = surface.ops.len(), "row rendered");
    }

    fn barcode(
        &mut self,
        doc: &mut PdfDocument,
        value: &str,
    ) -> sheetpress_core::error::Result<PlacedBarcode> {
        if let Some(placed) = self.barcodes.get(value) {
            return Ok(placed.clone());
        }
        let raster = BarcodeRaster::encode(value)?;
        let placed = PlacedBarcode {
            xobject: doc.add_image(&raster.to_raw_image()),
            width_px: raster.width() as usize,
            height_px: raster.height() as usize,
        };
        self.barcodes.insert(value.to_owned(), placed.clone());
        Ok(placed)
    }
}

/// Scale an embedded image into the box whose top-left corner is `position`.
fn place_image(
    page: &PageTemplate,
    id: XObjectId,
    (source_w, source_h): (usize, usize),
    position: Position,
    size: ImageSize,
) -> Op {
    let target_w_pt = size.width * PageTemplate::PT_PER_PX;
    let target_h_pt = size.height * PageTemplate::PT_PER_PX;
    // PDF places the image by its bottom-left corner.
    let bottom_pt = page.height_pt() - (position.y + size.height) * PageTemplate::PT_PER_PX;

    Op::UseXobject {
        id,
        transform: XObjectTransform {
            translate_x: Some(Pt((position.x * PageTemplate::PT_PER_PX) as f32)),
            translate_y: Some(Pt(bottom_pt as f32)),
            scale_x: Some((target_w_pt / source_w.max(1) as f64) as f32),
            scale_y: Some((target_h_pt / source_h.max(1) as f64) as f32),
            dpi: Some(IMAGE_DPI),
            rotate: None,
        },
    }
}

/// Write `text` with its baseline anchored at the field position, rotated
/// counter-clockwise about that anchor.
fn draw_text(
    surface: &mut PageSurface,
    page: &PageTemplate,
    style: &FieldStyle,
    font: &ResolvedFont,
    text: String,
) {
    let x = Pt((style.position.x * PageTemplate::PT_PER_PX) as f32);
    let y = Pt((page.height_pt() - style.position.y * PageTemplate::PT_PER_PX) as f32);
    let size = Pt(style.font.size as f32);
    let rotation = style.rotation_deg.rem_euclid(360.0);

    let ops = &mut surface.ops;
    ops.push(Op::StartTextSection);
    if rotation == 0.0 {
        ops.push(Op::SetTextCursor {
            pos: Point { x, y },
        });
    } else {
        ops.push(Op::SetTextMatrix {
            matrix: TextMatrix::TranslateRotate(x, y, rotation as f32),
        });
    }
    match font {
        ResolvedFont::Builtin(builtin) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size,
                font: *builtin,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text)],
                font: *builtin,
            });
        }
        ResolvedFont::Embedded(id) => {
            ops.push(Op::SetFontSize {
                size,
                font: id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(text)],
                font: id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSource;
    use crate::fonts::tests::roboto;
    use crate::overlay;
    use crate::overlay::tests::png_bytes;
    use printpdf::{BuiltinFont, FontId};
    use sheetpress_core::{Dataset, ImageBlob};

    fn name(s: &str) -> FieldName {
        FieldName::new(s).expect("valid name")
    }

    struct Fixture {
        config: ExportConfig,
        dataset: Dataset,
        model: LayoutModel,
        fonts: Vec<FontSource>,
    }

    impl Fixture {
        fn new(rows: Vec<Row>) -> Self {
            Self {
                config: ExportConfig::default(),
                dataset: Dataset::from_rows(rows),
                model: LayoutModel::new(),
                fonts: Vec::new(),
            }
        }

        fn render_first(&self) -> (PageSurface, Vec<ExportWarning>) {
            let mut doc = PdfDocument::new("render");
            let mut warnings = Vec::new();
            let fonts = FontRegistrar::register(
                &mut doc,
                &self.fonts,
                &self.config.default_font_family,
                &mut warnings,
            );
            let overlays = overlay::prepare(&mut doc, &self.model, &mut warnings);
            let mut renderer = PageRenderer::new(
                &self.config,
                self.dataset.headers(),
                &self.model,
                &overlays,
                fonts,
            );
            let mut surface = PageSurface::new();
            renderer.render(
                &mut doc,
                0,
                &self.dataset.rows()[0],
                &mut surface,
                &mut warnings,
            );
            (surface, warnings)
        }
    }

    fn texts(surface: &PageSurface) -> Vec<String> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::WriteTextBuiltinFont { items, .. } | Op::WriteText { items, .. } => {
                    items.iter().find_map(|i| match i {
                        TextItem::Text(t) => Some(t.clone()),
                        _ => None,
                    })
                }
                _ => None,
            })
            .collect()
    }

    fn cursors(surface: &PageSurface) -> Vec<(f32, f32)> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::SetTextCursor { pos } => Some((pos.x.0, pos.y.0)),
                _ => None,
            })
            .collect()
    }

    fn image_transforms(surface: &PageSurface) -> Vec<XObjectTransform> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::UseXobject { transform, .. } => Some(transform.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unplaced_field_uses_documented_defaults() {
        let fx = Fixture::new(vec![Row::new().with(name("name"), "Alice")]);
        let (surface, warnings) = fx.render_first();

        assert!(warnings.is_empty());
        assert_eq!(texts(&surface), vec!["name: Alice".to_string()]);
        // (50, 50) px on a 180 px page: x = 37.5 pt, baseline 135 - 37.5 pt.
        assert_eq!(cursors(&surface), vec![(37.5, 97.5)]);
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            Op::SetFontSizeBuiltinFont { size, font: BuiltinFont::Helvetica } if size.0 == 16.0
        )));
    }

    #[test]
    fn barcode_field_draws_an_image_in_the_barcode_box() {
        let fx = Fixture::new(vec![
            Row::new()
                .with(name("name"), "Alice")
                .with(name("barcode"), "12345"),
        ]);
        let (surface, warnings) = fx.render_first();

        assert!(warnings.is_empty());
        assert_eq!(texts(&surface), vec!["name: Alice".to_string()]);

        let transforms = image_transforms(&surface);
        assert_eq!(transforms.len(), 1);
        let t = &transforms[0];
        assert_eq!(t.translate_x, Some(Pt(37.5)));
        // Box top at 50 px, 50 px tall: bottom edge at 100 px => 135 - 75 pt.
        assert_eq!(t.translate_y, Some(Pt(60.0)));
        assert!(t.rotate.is_none());
    }

    #[test]
    fn unencodable_barcode_falls_back_to_text() {
        let fx = Fixture::new(vec![Row::new().with(name("barcode"), "naïve")]);
        let (surface, warnings) = fx.render_first();

        assert_eq!(texts(&surface), vec!["barcode: naïve".to_string()]);
        assert!(image_transforms(&surface).is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].row, Some(0));
    }

    #[test]
    fn empty_barcode_value_is_plain_text_without_warning() {
        let fx = Fixture::new(vec![Row::new().with(name("barcode"), "")]);
        let (surface, warnings) = fx.render_first();
        assert_eq!(texts(&surface), vec!["barcode: ".to_string()]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn rotation_uses_a_text_matrix() {
        let mut fx = Fixture::new(vec![Row::new().with(name("title"), "Hi")]);
        fx.model.set_field_rotation(name("title"), -90.0).expect("rotate");
        let (surface, _) = fx.render_first();

        assert!(cursors(&surface).is_empty());
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            Op::SetTextMatrix { matrix: TextMatrix::TranslateRotate(_, _, r) } if *r == 270.0
        )));
    }

    #[test]
    fn embedded_family_writes_with_its_font_id() {
        let mut fx = Fixture::new(vec![
            Row::new()
                .with(name("title"), "Grüße")
                .with(name("name"), "Alice"),
        ]);
        fx.fonts.push(roboto("Roboto"));
        fx.model.set_field_font(name("title"), "roboto", 20.0).expect("font");
        fx.model.set_field_rotation(name("title"), 45.0).expect("rotate");
        let (surface, warnings) = fx.render_first();

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        let embedded: Vec<&FontId> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::WriteText { items, font } => {
                    assert_eq!(items, &vec![TextItem::Text("title: Grüße".into())]);
                    Some(font)
                }
                _ => None,
            })
            .collect();
        assert_eq!(embedded.len(), 1);
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            Op::SetFontSize { size, font } if size.0 == 20.0 && font == embedded[0]
        )));
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            Op::SetTextMatrix { matrix: TextMatrix::TranslateRotate(_, _, r) } if *r == 45.0
        )));
        // The other field keeps the built-in default.
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            Op::WriteTextBuiltinFont { font: BuiltinFont::Helvetica, .. }
        )));
    }

    #[test]
    fn full_turn_is_treated_as_unrotated() {
        let mut fx = Fixture::new(vec![Row::new().with(name("title"), "Hi")]);
        fx.model.set_field_rotation(name("title"), 720.0).expect("rotate");
        let (surface, _) = fx.render_first();
        assert_eq!(cursors(&surface).len(), 1);
    }

    #[test]
    fn images_paint_before_fields_in_index_order() {
        let mut fx = Fixture::new(vec![Row::new().with(name("name"), "Alice")]);
        let first = fx.model
            .add_image(ImageBlob::new("image/png", png_bytes(10, 10)))
            .expect("add image");
        let second = fx.model
            .add_image(ImageBlob::new("image/png", png_bytes(20, 10)))
            .expect("add image");
        fx.model
            .set_image_position(second, Position { x: 20.0, y: 40.0 })
            .expect("pos");
        fx.model
            .set_image_size(first, ImageSize::new(40.0, 20.0).expect("size"))
            .expect("size");

        let (surface, _) = fx.render_first();
        let first_text = surface
            .ops()
            .iter()
            .position(|op| matches!(op, Op::StartTextSection))
            .expect("text");
        let transforms = image_transforms(&surface);
        assert_eq!(transforms.len(), 2);
        assert!(
            surface.ops()[..first_text]
                .iter()
                .filter(|op| matches!(op, Op::UseXobject { .. }))
                .count()
                == 2
        );

        // First image: default position, 40x20 px from a 10x10 source.
        assert_eq!(transforms[0].translate_x, Some(Pt(0.0)));
        assert_eq!(transforms[0].scale_x, Some(3.0));
        assert_eq!(transforms[0].scale_y, Some(1.5));
        // Second image: moved, default 100x100 px size.
        assert_eq!(transforms[1].translate_x, Some(Pt(15.0)));
        assert_eq!(transforms[1].translate_y, Some(Pt(135.0 - 105.0)));
    }

    #[test]
    fn fields_follow_header_order_and_ignore_unknown_names() {
        let mut fx = Fixture::new(vec![
            Row::new()
                .with(name("b"), "2")
                .with(name("a"), "1"),
        ]);
        fx.model
            .set_field_position(name("not-a-column"), Position { x: 1.0, y: 1.0 })
            .expect("pos");
        let (surface, _) = fx.render_first();
        assert_eq!(texts(&surface), vec!["b: 2".to_string(), "a: 1".to_string()]);
    }

    #[test]
    fn missing_cell_renders_empty_value() {
        let fx = Fixture {
            dataset: Dataset::with_headers(
                vec![name("name"), name("city")],
                vec![Row::new().with(name("name"), "Bob")],
            ),
            ..Fixture::new(Vec::new())
        };
        let (surface, _) = fx.render_first();
        assert_eq!(
            texts(&surface),
            vec!["name: Bob".to_string(), "city: ".to_string()]
        );
    }
}

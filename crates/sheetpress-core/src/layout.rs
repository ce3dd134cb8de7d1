// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout model — the authoritative placement and style state for every field
// and overlay image.
//
// Image indices are stable and never reused while a model is alive: removing
// image `i` leaves every other index (and its position/size) untouched, and
// the next added image takes a fresh index past the highest one ever used.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{Result, SheetpressError};
use crate::types::{FieldName, FieldStyle, FontSpec, ImageBlob, ImageIndex, ImageSize, Position};

/// Placement and style state for fields and overlay images.
///
/// Every setter is an upsert: unknown names and indices are created on first
/// write. Values are validated here so that the renderer never sees a
/// degenerate size or a non-finite coordinate.
#[derive(Debug, Clone, Default)]
pub struct LayoutModel {
    field_positions: BTreeMap<FieldName, Position>,
    field_rotations: BTreeMap<FieldName, f64>,
    field_fonts: BTreeMap<FieldName, FontSpec>,
    images: BTreeMap<ImageIndex, ImageBlob>,
    image_positions: BTreeMap<ImageIndex, Position>,
    image_sizes: BTreeMap<ImageIndex, ImageSize>,
    /// Next index handed out by `add_image`. Only ever grows.
    next_image: ImageIndex,
    /// Set once `u32::MAX` has been used; no index is left to hand out.
    indices_exhausted: bool,
}

/// Returned by [`LayoutModel::reset_all`]; hand it to the settings store so
/// the persisted blob is deleted along with the in-memory state.
#[must_use = "the persisted layout is only deleted once the reset is applied to the store"]
#[derive(Debug)]
pub struct ResetRequested(());

impl LayoutModel {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Fields ---------------------------------------------------------------

    pub fn set_field_position(&mut self, name: FieldName, position: Position) -> Result<()> {
        let position = Position::new(position.x, position.y)?;
        debug!(field = %name, x = position.x, y = position.y, "field moved");
        self.field_positions.insert(name, position);
        Ok(())
    }

    /// Set the counter-clockwise rotation in degrees. Any finite angle is
    /// accepted; angles are equivalent modulo 360.
    pub fn set_field_rotation(&mut self, name: FieldName, degrees: f64) -> Result<()> {
        if !degrees.is_finite() {
            return Err(SheetpressError::InvalidLayout(format!(
                "rotation {degrees} is not finite"
            )));
        }
        debug!(field = %name, degrees, "field rotated");
        self.field_rotations.insert(name, degrees);
        Ok(())
    }

    pub fn set_field_font(&mut self, name: FieldName, family: &str, size: f64) -> Result<()> {
        let font = FontSpec::new(family, size)?;
        debug!(field = %name, family, size, "field font changed");
        self.field_fonts.insert(name, font);
        Ok(())
    }

    /// Resolve the placement and style of `name`, applying the documented
    /// defaults for anything never set.
    pub fn resolve_field(&self, name: &FieldName, config: &ExportConfig) -> FieldStyle {
        FieldStyle {
            position: self
                .field_positions
                .get(name)
                .copied()
                .unwrap_or(ExportConfig::DEFAULT_FIELD_POSITION),
            rotation_deg: self.field_rotations.get(name).copied().unwrap_or(0.0),
            font: self
                .field_fonts
                .get(name)
                .cloned()
                .unwrap_or_else(|| config.default_font()),
        }
    }

    // -- Images ---------------------------------------------------------------

    /// Append a newly uploaded image and return its index.
    ///
    /// Fails with [`SheetpressError::InvalidLayout`] once every index has
    /// been used, since an index is never handed out twice.
    pub fn add_image(&mut self, blob: ImageBlob) -> Result<ImageIndex> {
        if self.indices_exhausted {
            return Err(SheetpressError::InvalidLayout(
                "no unused image index is left".into(),
            ));
        }
        let index = self.next_image;
        self.restore_image(index, blob);
        Ok(index)
    }

    /// Put an image back at a known index (used when hydrating a saved layout).
    pub fn restore_image(&mut self, index: ImageIndex, blob: ImageBlob) {
        debug!(%index, bytes = blob.bytes.len(), mime = %blob.mime, "image stored");
        self.images.insert(index, blob);
        self.bump_next_image(index);
    }

    pub fn set_image_position(&mut self, index: ImageIndex, position: Position) -> Result<()> {
        let position = Position::new(position.x, position.y)?;
        self.image_positions.insert(index, position);
        self.bump_next_image(index);
        Ok(())
    }

    pub fn set_image_size(&mut self, index: ImageIndex, size: ImageSize) -> Result<()> {
        let size = ImageSize::new(size.width, size.height)?;
        self.image_sizes.insert(index, size);
        self.bump_next_image(index);
        Ok(())
    }

    /// Delete an image together with its position and size. Other indices are
    /// not renumbered. Returns whether anything was removed.
    pub fn remove_image(&mut self, index: ImageIndex) -> bool {
        let blob = self.images.remove(&index);
        let position = self.image_positions.remove(&index);
        let size = self.image_sizes.remove(&index);
        let removed = blob.is_some() || position.is_some() || size.is_some();
        debug!(%index, removed, "image removed");
        removed
    }

    pub fn image_position(&self, index: ImageIndex) -> Position {
        self.image_positions
            .get(&index)
            .copied()
            .unwrap_or(ExportConfig::DEFAULT_IMAGE_POSITION)
    }

    pub fn image_size(&self, index: ImageIndex) -> ImageSize {
        self.image_sizes.get(&index).copied().unwrap_or_default()
    }

    /// Images in ascending index order, i.e. paint order.
    pub fn images(&self) -> impl Iterator<Item = (ImageIndex, &ImageBlob)> {
        self.images.iter().map(|(i, b)| (*i, b))
    }

    fn bump_next_image(&mut self, index: ImageIndex) {
        if self.indices_exhausted || index < self.next_image {
            return;
        }
        match index.next() {
            Some(next) => self.next_image = next,
            None => self.indices_exhausted = true,
        }
    }

    // -- Whole model ----------------------------------------------------------

    /// Clear every map back to defaults.
    pub fn reset_all(&mut self) -> ResetRequested {
        let (next_image, indices_exhausted) = (self.next_image, self.indices_exhausted);
        *self = Self::default();
        // Indices stay unique across a reset within one session.
        self.next_image = next_image;
        self.indices_exhausted = indices_exhausted;
        debug!("layout reset");
        ResetRequested(())
    }

    pub fn is_empty(&self) -> bool {
        self.field_positions.is_empty()
            && self.field_rotations.is_empty()
            && self.field_fonts.is_empty()
            && self.images.is_empty()
            && self.image_positions.is_empty()
            && self.image_sizes.is_empty()
    }

    pub fn field_positions(&self) -> &BTreeMap<FieldName, Position> {
        &self.field_positions
    }

    pub fn field_rotations(&self) -> &BTreeMap<FieldName, f64> {
        &self.field_rotations
    }

    pub fn field_fonts(&self) -> &BTreeMap<FieldName, FontSpec> {
        &self.field_fonts
    }

    pub fn image_blobs(&self) -> &BTreeMap<ImageIndex, ImageBlob> {
        &self.images
    }

    pub fn image_positions(&self) -> &BTreeMap<ImageIndex, Position> {
        &self.image_positions
    }

    pub fn image_sizes(&self) -> &BTreeMap<ImageIndex, ImageSize> {
        &self.image_sizes
    }
}

/// Models compare by their persisted maps; the index counter is session state.
impl PartialEq for LayoutModel {
    fn eq(&self, other: &Self) -> bool {
        self.field_positions == other.field_positions
            && self.field_rotations == other.field_rotations
            && self.field_fonts == other.field_fonts
            && self.images == other.images
            && self.image_positions == other.image_positions
            && self.image_sizes == other.image_sizes
    }
}

/// An in-progress rotation entry for one field.
///
/// The value typed by the user is held here and only written to the model on
/// [`RotationEdit::commit`] (blur / confirm). Dropping the edit discards it.
#[derive(Debug, Clone)]
pub struct RotationEdit {
    field: FieldName,
    pending: Option<f64>,
}

impl RotationEdit {
    pub fn begin(field: FieldName) -> Self {
        Self {
            field,
            pending: None,
        }
    }

    pub fn update(&mut self, degrees: f64) {
        self.pending = Some(degrees);
    }

    pub fn field(&self) -> &FieldName {
        &self.field
    }

    pub fn pending(&self) -> Option<f64> {
        self.pending
    }

    /// Write the pending value, if any, into `model`.
    pub fn commit(self, model: &mut LayoutModel) -> Result<()> {
        match self.pending {
            Some(degrees) => model.set_field_rotation(self.field, degrees),
            None => Ok(()),
        }
    }
}

/// Which field the canvas currently has selected. Never part of the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<FieldName>,
}

impl Selection {
    /// Select `name`, or clear the selection if it is already selected.
    pub fn toggle(&mut self, name: &FieldName) {
        if self.current.as_ref() == Some(name) {
            self.current = None;
        } else {
            self.current = Some(name.clone());
        }
    }

    pub fn current(&self) -> Option<&FieldName> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

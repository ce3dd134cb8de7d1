// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings codec — the persisted layout blob.
//
// Blob layout (one JSON object):
//   positions       { field -> {x, y} }
//   rotations       { field -> degrees }
//   fonts           { field -> {family, size} }
//   uploadedImages  { index -> "data:<mime>;base64,..." }
//   imagePositions  { index -> {x, y} }
//   imageSizes      { index -> {width, height} }
//   version         format version, informational
//
// Every key is optional on load. A missing or non-object key loads as an
// empty map, and a single bad entry is skipped without dropping its siblings.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetpress_core::error::{Result, SheetpressError};
use sheetpress_core::{
    ExportConfig, FieldName, FontSpec, ImageBlob, ImageIndex, ImageSize, LayoutModel, Position,
};
use tracing::{debug, instrument, warn};

/// Current blob format version.
pub const FORMAT_VERSION: u32 = 2;

const POSITIONS: &str = "positions";
const ROTATIONS: &str = "rotations";
const FONTS: &str = "fonts";
const UPLOADED_IMAGES: &str = "uploadedImages";
const IMAGE_POSITIONS: &str = "imagePositions";
const IMAGE_SIZES: &str = "imageSizes";
// Older blobs kept family and size in separate maps.
const LEGACY_FONT_FAMILIES: &str = "fontFamilies";
const LEGACY_FONT_SIZES: &str = "fontSizes";

#[derive(Serialize)]
struct Blob<'a> {
    version: u32,
    positions: &'a BTreeMap<FieldName, Position>,
    rotations: &'a BTreeMap<FieldName, f64>,
    fonts: &'a BTreeMap<FieldName, FontSpec>,
    #[serde(rename = "uploadedImages")]
    uploaded_images: BTreeMap<ImageIndex, String>,
    #[serde(rename = "imagePositions")]
    image_positions: &'a BTreeMap<ImageIndex, Position>,
    #[serde(rename = "imageSizes")]
    image_sizes: &'a BTreeMap<ImageIndex, ImageSize>,
}

/// Encode `model` as the persisted blob. Output is deterministic: maps are
/// written in key order.
#[instrument(skip_all, fields(images = model.image_blobs().len()))]
pub fn serialize(model: &LayoutModel) -> Result<String> {
    let blob = Blob {
        version: FORMAT_VERSION,
        positions: model.field_positions(),
        rotations: model.field_rotations(),
        fonts: model.field_fonts(),
        uploaded_images: model
            .image_blobs()
            .iter()
            .map(|(i, b)| (*i, b.to_data_url()))
            .collect(),
        image_positions: model.image_positions(),
        image_sizes: model.image_sizes(),
    };
    let json = serde_json::to_string_pretty(&blob)?;
    debug!(bytes = json.len(), "layout serialised");
    Ok(json)
}

/// Decode a persisted blob into a fresh model.
///
/// Fails only when the blob is not a JSON object at all.
#[instrument(skip_all, fields(bytes = blob.len()))]
pub fn deserialize(blob: &str) -> Result<LayoutModel> {
    let value: Value = serde_json::from_str(blob)
        .map_err(|e| SheetpressError::Settings(format!("not valid JSON: {e}")))?;
    let Value::Object(root) = value else {
        return Err(SheetpressError::Settings(
            "expected a JSON object at the top level".into(),
        ));
    };

    if let Some(version) = root.get("version") {
        debug!(%version, "reading layout blob");
    }

    let mut model = LayoutModel::new();

    each_entry(&root, POSITIONS, |s: &str| FieldName::new(s), |name, pos: Position| {
        model.set_field_position(name, pos)
    });
    each_entry(&root, ROTATIONS, |s: &str| FieldName::new(s), |name, deg: f64| {
        model.set_field_rotation(name, deg)
    });
    if root.contains_key(FONTS) {
        each_entry(&root, FONTS, |s: &str| FieldName::new(s), |name, font: FontSpec| {
            model.set_field_font(name, &font.family, font.size)
        });
    } else {
        load_legacy_fonts(&root, &mut model);
    }

    load_images(&root, &mut model);
    each_entry(&root, IMAGE_POSITIONS, parse_index, |idx, pos: Position| {
        model.set_image_position(idx, pos)
    });
    each_entry(&root, IMAGE_SIZES, parse_index, |idx, size: SizeEntry| {
        model.set_image_size(idx, size.to_size()?)
    });

    debug!(
        fields = model.field_positions().len(),
        images = model.image_blobs().len(),
        "layout deserialised"
    );
    Ok(model)
}

// -- Entry helpers -------------------------------------------------------------

/// Apply every entry of the object under `key`, skipping entries whose key or
/// value does not parse, or that the model rejects.
fn each_entry<K, V>(
    root: &Map<String, Value>,
    key: &str,
    parse_key: impl Fn(&str) -> Result<K>,
    mut apply: impl FnMut(K, V) -> Result<()>,
) where
    V: DeserializeOwned,
{
    let Some(entries) = object_under(root, key) else {
        return;
    };
    for (raw_key, raw_value) in entries {
        let outcome = parse_key(raw_key.as_str()).and_then(|k| {
            let v = V::deserialize(raw_value)
                .map_err(|e| SheetpressError::Settings(e.to_string()))?;
            apply(k, v)
        });
        if let Err(e) = outcome {
            warn!(key, entry = %raw_key, error = %e, "skipping malformed layout entry");
        }
    }
}

fn object_under<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    let value = root.get(key)?;
    match value.as_object() {
        Some(map) => Some(map),
        None => {
            warn!(key, "expected an object, loading as empty");
            None
        }
    }
}

fn parse_index(raw: &str) -> Result<ImageIndex> {
    raw.parse::<u32>()
        .map(ImageIndex)
        .map_err(|_| SheetpressError::Settings(format!("{raw:?} is not an image index")))
}

/// `uploadedImages` is an index-keyed object; older blobs stored a plain
/// array in upload order.
fn load_images(root: &Map<String, Value>, model: &mut LayoutModel) {
    if let Some(Value::Array(items)) = root.get(UPLOADED_IMAGES) {
        for (i, item) in items.iter().enumerate() {
            let outcome = item
                .as_str()
                .ok_or_else(|| SheetpressError::Settings("image is not a string".into()))
                .and_then(ImageBlob::from_data_url);
            match outcome {
                Ok(blob) => model.restore_image(ImageIndex(i as u32), blob),
                Err(e) => warn!(index = i, error = %e, "skipping unreadable image"),
            }
        }
        return;
    }

    each_entry(root, UPLOADED_IMAGES, parse_index, |idx, url: String| {
        let blob = ImageBlob::from_data_url(&url)?;
        model.restore_image(idx, blob);
        Ok(())
    });
}

fn load_legacy_fonts(root: &Map<String, Value>, model: &mut LayoutModel) {
    let mut families: BTreeMap<FieldName, String> = BTreeMap::new();
    let mut sizes: BTreeMap<FieldName, f64> = BTreeMap::new();
    each_entry(root, LEGACY_FONT_FAMILIES, |s: &str| FieldName::new(s), |name, family: String| {
        families.insert(name, family);
        Ok(())
    });
    each_entry(root, LEGACY_FONT_SIZES, |s: &str| FieldName::new(s), |name, size: f64| {
        sizes.insert(name, size);
        Ok(())
    });
    if families.is_empty() && sizes.is_empty() {
        return;
    }

    let defaults = ExportConfig::default().default_font();
    let names: BTreeSet<FieldName> = families.keys().chain(sizes.keys()).cloned().collect();
    for name in names {
        let family = families.get(&name).unwrap_or(&defaults.family).clone();
        let size = sizes.get(&name).copied().unwrap_or(defaults.size);
        if let Err(e) = model.set_field_font(name.clone(), &family, size) {
            warn!(field = %name, error = %e, "skipping legacy font entry");
        }
    }
}

/// Image size as stored; dimensions may be numbers or CSS strings ("120px").
#[derive(Deserialize)]
struct SizeEntry {
    width: Dimension,
    height: Dimension,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Dimension {
    Number(f64),
    Css(String),
}

impl Dimension {
    fn value(&self) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Css(s) => {
                let trimmed = s.trim();
                let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
                digits.parse::<f64>().map_err(|_| {
                    SheetpressError::Settings(format!("{s:?} is not a pixel length"))
                })
            }
        }
    }
}

impl SizeEntry {
    fn to_size(&self) -> Result<ImageSize> {
        ImageSize::new(self.width.value()?, self.height.value()?)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: field and image keys, placement geometry, embedded image
// blobs, and the imported row data.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetpressError};

/// Reserved field name that is rendered as a barcode instead of text.
pub const BARCODE_FIELD: &str = "barcode";

/// Name of a placeable field, taken from a spreadsheet column header.
///
/// Names are validated but never trimmed, so they always match the keys of
/// the imported rows exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() || name.chars().any(char::is_control) {
            return Err(SheetpressError::InvalidFieldName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this field renders as a barcode.
    pub fn is_barcode(&self) -> bool {
        self.0 == BARCODE_FIELD
    }
}

impl TryFrom<String> for FieldName {
    type Error = SheetpressError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(value: FieldName) -> Self {
        value.0
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of an overlay image (its slot in upload order).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ImageIndex(pub u32);

impl ImageIndex {
    /// The following index, or `None` past `u32::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for ImageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page-local position in layout pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(SheetpressError::InvalidLayout(format!(
                "position ({x}, {y}) is not finite"
            )));
        }
        Ok(Self { x, y })
    }
}

/// Bounding box of an overlay image in layout pixels. Both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub const DEFAULT: Self = Self {
        width: 100.0,
        height: 100.0,
    };

    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(SheetpressError::InvalidLayout(format!(
                "image size {width}x{height} must be positive"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Font family and size (in points) for a text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Result<Self> {
        let family = family.into();
        if family.trim().is_empty() {
            return Err(SheetpressError::InvalidLayout(
                "font family must not be empty".into(),
            ));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(SheetpressError::InvalidLayout(format!(
                "font size {size} must be positive"
            )));
        }
        Ok(Self { family, size })
    }
}

/// Fully resolved placement and style of one field, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStyle {
    pub position: Position,
    pub rotation_deg: f64,
    pub font: FontSpec,
}

/// An encoded overlay image together with its MIME type.
///
/// Persisted as a `data:` URL so the blob describes its own encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Encode as `data:<mime>;base64,<payload>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| SheetpressError::Settings("image is not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| SheetpressError::Settings("data URL has no payload".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| SheetpressError::Settings("data URL is not base64".into()))?;
        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| SheetpressError::Settings(format!("bad base64 image payload: {e}")))?;
        Ok(Self::new(mime, bytes))
    }
}

/// A scalar spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            // Whole numbers print without a fractional part ("12345", not "12345.0").
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One imported record: an ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(FieldName, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell, replacing an existing cell of the same name in place.
    pub fn with(mut self, name: FieldName, value: impl Into<CellValue>) -> Self {
        let value = value.into();
        match self.cells.iter_mut().find(|(n, _)| *n == name) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &FieldName) -> Option<&CellValue> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.cells.iter().map(|(n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Imported rows plus the ordered header set derived from the first record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<FieldName>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset whose headers are the keys of the first row, in order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let headers = rows
            .first()
            .map(|r| r.names().cloned().collect())
            .unwrap_or_default();
        Self { headers, rows }
    }

    /// Build a dataset with an explicit header order.
    pub fn with_headers(headers: Vec<FieldName>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[FieldName] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A dataset is ready for export once it holds at least one row.
    pub fn is_ready(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Fixed page geometry for a whole document, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    pub width_px: f64,
    pub height_px: f64,
}

impl PageTemplate {
    /// Points per layout pixel (CSS pixels at 96 dpi).
    pub const PT_PER_PX: f64 = 0.75;

    pub fn new(width_px: f64, height_px: f64) -> Result<Self> {
        let size = ImageSize::new(width_px, height_px)
            .map_err(|_| SheetpressError::InvalidLayout(format!(
                "page size {width_px}x{height_px} must be positive"
            )))?;
        Ok(Self {
            width_px: size.width,
            height_px: size.height,
        })
    }

    /// A4 portrait at 96 dpi.
    pub fn a4() -> Self {
        Self {
            width_px: 794.0,
            height_px: 1123.0,
        }
    }

    pub fn width_pt(&self) -> f64 {
        self.width_px * Self::PT_PER_PX
    }

    pub fn height_pt(&self) -> f64 {
        self.height_px * Self::PT_PER_PX
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            width_px: 180.0,
            height_px: 180.0,
        }
    }
}

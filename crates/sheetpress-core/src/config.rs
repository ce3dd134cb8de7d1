// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{FontSpec, ImageSize, PageTemplate, Position};

/// Persistent export settings. Fixed for the lifetime of one exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Page geometry shared by every page of the document.
    pub page: PageTemplate,
    /// Family used for fields with no font of their own, and as the
    /// substitute for families that cannot be resolved.
    pub default_font_family: String,
    /// Font size (pt) for fields with no font of their own.
    pub default_font_size: f64,
    /// Box a barcode image is scaled into, in layout pixels.
    pub barcode_box: ImageSize,
    /// Title embedded in the PDF /Info dictionary.
    pub title: String,
}

impl ExportConfig {
    /// Position of a field that was never placed.
    pub const DEFAULT_FIELD_POSITION: Position = Position { x: 50.0, y: 50.0 };

    /// Position of an image that was never moved.
    pub const DEFAULT_IMAGE_POSITION: Position = Position::ORIGIN;

    /// Font applied to fields with no recorded font.
    pub fn default_font(&self) -> FontSpec {
        FontSpec {
            family: self.default_font_family.clone(),
            size: self.default_font_size,
        }
    }

    /// Check values that may have been edited by hand in `config.json`.
    pub fn validate(&self) -> Result<()> {
        PageTemplate::new(self.page.width_px, self.page.height_px)?;
        FontSpec::new(self.default_font_family.as_str(), self.default_font_size)?;
        ImageSize::new(self.barcode_box.width, self.barcode_box.height)?;
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page: PageTemplate::default(),
            default_font_family: "Arial".into(),
            default_font_size: 16.0,
            barcode_box: ImageSize {
                width: 100.0,
                height: 50.0,
            },
            title: "Sheetpress Export".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: ExportConfig =
            serde_json::from_str(r#"{"default_font_family":"Amiri"}"#).expect("parse");
        assert_eq!(cfg.default_font_family, "Amiri");
        assert_eq!(cfg.default_font_size, 16.0);
        assert_eq!(cfg.page, PageTemplate::default());
    }

    #[test]
    fn degenerate_values_fail_validation() {
        assert!(ExportConfig::default().validate().is_ok());

        let mut cfg = ExportConfig::default();
        cfg.page.height_px = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ExportConfig::default();
        cfg.default_font_size = -3.0;
        assert!(cfg.validate().is_err());
    }
}

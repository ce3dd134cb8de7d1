// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font registrar — embeds custom font programs once per document and maps
// each requested family to something the page can actually be drawn with.
//
// Resolution order: embedded family, built-in standard family, the configured
// default family, Helvetica. Family names compare case-insensitively.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use printpdf::{BuiltinFont, FontId, ParsedFont, PdfDocument};
use sheetpress_core::error::{Result, SheetpressError};
use tracing::{debug, info, instrument, warn};

use crate::warnings::ExportWarning;

/// A font program supplied by the caller, embedded under `family`.
#[derive(Debug, Clone)]
pub struct FontSource {
    pub family: String,
    pub bytes: Vec<u8>,
}

impl FontSource {
    pub fn new(family: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            family: family.into(),
            bytes,
        }
    }

    /// Read a TrueType/OpenType file from disk.
    pub fn from_file(family: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(Self::new(family, bytes))
    }
}

/// A font the page renderer can draw with.
#[derive(Debug, Clone)]
pub enum ResolvedFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// Map a family name onto one of the PDF standard fonts, if it names one.
pub fn builtin_family(family: &str) -> Option<BuiltinFont> {
    match family.trim().to_ascii_lowercase().as_str() {
        "arial" | "helvetica" | "sans-serif" => Some(BuiltinFont::Helvetica),
        "times new roman" | "times" | "times-roman" | "serif" => Some(BuiltinFont::TimesRoman),
        "courier new" | "courier" | "monospace" => Some(BuiltinFont::Courier),
        _ => None,
    }
}

fn family_key(family: &str) -> String {
    family.trim().to_lowercase()
}

/// Embedded fonts of one document and the fallback policy for the rest.
pub struct FontRegistrar {
    embedded: HashMap<String, FontId>,
    default_family: String,
    /// Families whose substitution has already been reported.
    reported: HashSet<String>,
}

impl FontRegistrar {
    /// Embed every distinct family in `sources` into `doc`.
    ///
    /// A family supplied more than once is embedded only the first time.
    /// Programs that cannot be parsed are reported in `warnings` and their
    /// family falls back to the default.
    #[instrument(skip_all, fields(sources = sources.len(), default_family = %default_family))]
    pub fn register(
        doc: &mut PdfDocument,
        sources: &[FontSource],
        default_family: &str,
        warnings: &mut Vec<ExportWarning>,
    ) -> Self {
        let mut registrar = Self {
            embedded: HashMap::new(),
            default_family: default_family.to_owned(),
            reported: HashSet::new(),
        };

        for source in sources {
            let key = family_key(&source.family);
            if registrar.embedded.contains_key(&key) || registrar.reported.contains(&key) {
                debug!(family = %source.family, "font family already registered, skipping");
                continue;
            }

            let mut parse_warnings = Vec::new();
            match ParsedFont::from_bytes(&source.bytes, 0, &mut parse_warnings) {
                Some(parsed) => {
                    let id = doc.add_font(&parsed);
                    info!(family = %source.family, bytes = source.bytes.len(), "font embedded");
                    registrar.embedded.insert(key, id);
                }
                None => {
                    let err = SheetpressError::FontRegistration {
                        family: source.family.clone(),
                        reason: format!(
                            "not a readable TrueType/OpenType program ({} parser warnings)",
                            parse_warnings.len()
                        ),
                    };
                    warn!(error = %err, "font registration failed");
                    // The failure is the report; don't report the substitution again.
                    registrar.reported.insert(key);
                    warnings.push(ExportWarning::document(err));
                }
            }
        }

        registrar
    }

    pub fn is_embedded(&self, family: &str) -> bool {
        self.embedded.contains_key(&family_key(family))
    }

    /// Resolve `family`, substituting the default when it is neither embedded
    /// nor a standard font. Each substituted family is reported once.
    pub fn resolve(&mut self, family: &str, warnings: &mut Vec<ExportWarning>) -> ResolvedFont {
        if let Some(font) = self.lookup(family) {
            return font;
        }

        let key = family_key(family);
        if self.reported.insert(key) {
            let err = SheetpressError::FontRegistration {
                family: family.to_owned(),
                reason: format!(
                    "not embedded and not a standard font; using {:?}",
                    self.default_family
                ),
            };
            warn!(error = %err, "font substituted");
            warnings.push(ExportWarning::document(err));
        }
        self.default_font()
    }

    /// The font used for fields without a family of their own.
    pub fn default_font(&self) -> ResolvedFont {
        self.lookup(&self.default_family)
            .unwrap_or(ResolvedFont::Builtin(BuiltinFont::Helvetica))
    }

    fn lookup(&self, family: &str) -> Option<ResolvedFont> {
        if let Some(id) = self.embedded.get(&family_key(family)) {
            return Some(ResolvedFont::Embedded(id.clone()));
        }
        builtin_family(family).map(ResolvedFont::Builtin)
    }
}

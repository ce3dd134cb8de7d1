// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Turn spreadsheet rows into a PDF, one page per row, using a saved layout.
#[derive(Debug, Parser)]
#[command(name = "sheetpress", about, version)]
pub struct Cli {
    /// Directory holding layoutSettings.json and config.json
    /// (default: $SHEETPRESS_DATA_DIR, then the XDG data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export every row of a spreadsheet as one PDF page
    Export(ExportArgs),

    /// Inspect and edit the saved layout
    #[command(subcommand)]
    Layout(LayoutCommand),

    /// Show or change the export configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Summarize the pages of an exported PDF
    Inspect {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Spreadsheet to read (xlsx, xls, xlsb or ods; first sheet only)
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Where to write the PDF
    #[arg(short, long, value_name = "OUT")]
    pub output: PathBuf,

    /// Embed a TrueType/OpenType font under a family name (repeatable)
    #[arg(long = "font", value_name = "FAMILY=PATH", value_parser = parse_font_arg)]
    pub fonts: Vec<(String, PathBuf)>,

    /// Page size in layout pixels for this run
    #[arg(long, value_name = "WxH", value_parser = parse_size_arg, conflicts_with = "a4")]
    pub page: Option<(f64, f64)>,

    /// Use an A4 portrait page for this run
    #[arg(long)]
    pub a4: bool,

    /// Document title for this run
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum LayoutCommand {
    /// Print the saved layout as JSON
    Show,

    /// Forget the saved layout
    Reset,

    /// Place, rotate or style a field
    SetField {
        /// Column name the field belongs to
        name: String,

        /// Position from the left edge, in layout pixels
        #[arg(long, requires = "y", allow_negative_numbers = true)]
        x: Option<f64>,

        /// Position from the top edge, in layout pixels
        #[arg(long, requires = "x", allow_negative_numbers = true)]
        y: Option<f64>,

        /// Counter-clockwise rotation in degrees
        #[arg(long, allow_negative_numbers = true)]
        rotation: Option<f64>,

        /// Font family
        #[arg(long)]
        font: Option<String>,

        /// Font size in points
        #[arg(long)]
        size: Option<f64>,
    },

    /// Add an overlay image and print its index
    AddImage {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Move an overlay image
    MoveImage {
        index: u32,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Resize an overlay image
    ResizeImage {
        index: u32,
        width: f64,
        height: f64,
    },

    /// Remove an overlay image; other images keep their indices
    RemoveImage { index: u32 },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration as JSON
    Show,

    /// Change and save configuration values
    Set {
        /// Page size in layout pixels
        #[arg(long, value_name = "WxH", value_parser = parse_size_arg)]
        page: Option<(f64, f64)>,

        /// Family used by fields without a font of their own
        #[arg(long)]
        font_family: Option<String>,

        /// Size used by fields without a font of their own
        #[arg(long)]
        font_size: Option<f64>,

        /// Barcode box in layout pixels
        #[arg(long, value_name = "WxH", value_parser = parse_size_arg)]
        barcode_box: Option<(f64, f64)>,

        /// Document title
        #[arg(long)]
        title: Option<String>,
    },
}

/// Parse `FAMILY=PATH`.
fn parse_font_arg(raw: &str) -> Result<(String, PathBuf), String> {
    let (family, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FAMILY=PATH, got {raw:?}"))?;
    if family.trim().is_empty() || path.is_empty() {
        return Err(format!("expected FAMILY=PATH, got {raw:?}"));
    }
    Ok((family.trim().to_owned(), PathBuf::from(path)))
}

/// Parse `WxH` (e.g. `180x180`).
fn parse_size_arg(raw: &str) -> Result<(f64, f64), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {raw:?}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad dimension {s:?}: {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn font_argument() {
        assert_eq!(
            parse_font_arg("Amiri=fonts/Amiri-Regular.ttf").expect("parse"),
            ("Amiri".to_string(), PathBuf::from("fonts/Amiri-Regular.ttf"))
        );
        assert!(parse_font_arg("Amiri").is_err());
        assert!(parse_font_arg("=x.ttf").is_err());
    }

    #[test]
    fn size_argument() {
        assert_eq!(parse_size_arg("180x180").expect("parse"), (180.0, 180.0));
        assert_eq!(parse_size_arg("794X1123").expect("parse"), (794.0, 1123.0));
        assert!(parse_size_arg("180").is_err());
        assert!(parse_size_arg("axb").is_err());
    }

    #[test]
    fn export_flags_parse() {
        let cli = Cli::try_parse_from([
            "sheetpress",
            "export",
            "rows.xlsx",
            "-o",
            "out.pdf",
            "--font",
            "Amiri=Amiri.ttf",
            "--page",
            "300x200",
        ])
        .expect("parse");
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.fonts.len(), 1);
                assert_eq!(args.page, Some((300.0, 200.0)));
                assert!(!args.a4);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn page_and_a4_conflict() {
        assert!(
            Cli::try_parse_from([
                "sheetpress", "export", "r.xlsx", "-o", "o.pdf", "--page", "1x1", "--a4",
            ])
            .is_err()
        );
    }

    #[test]
    fn negative_rotation_is_accepted() {
        let cli = Cli::try_parse_from([
            "sheetpress", "layout", "set-field", "title", "--rotation", "-90",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Layout(LayoutCommand::SetField { rotation: Some(r), .. }) if r == -90.0
        ));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `sheetpress export` — import a spreadsheet and write one page per row.

use anyhow::{Context, Result, bail};
use sheetpress_core::human_errors::{Severity, humanize_error};
use sheetpress_core::{ExportConfig, PageTemplate};
use sheetpress_document::{DocumentExporter, ExportWarning, FontSource, import_file};
use tracing::info;

use crate::cli::ExportArgs;
use crate::session::Session;

pub fn run(session: &Session, args: &ExportArgs) -> Result<()> {
    let config = effective_config(session.config(), args)?;

    let dataset = import_file(&args.data)
        .with_context(|| format!("importing {}", args.data.display()))?;
    if !dataset.is_ready() {
        bail!(
            "{} has no data rows below its header row; nothing to export",
            args.data.display()
        );
    }

    let fonts = args
        .fonts
        .iter()
        .map(|(family, path)| {
            FontSource::from_file(family.as_str(), path)
                .with_context(|| format!("reading font {family:?} from {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let model = session.layout();
    let exporter = DocumentExporter::new(config).with_fonts(fonts);
    let output = exporter
        .export_to_file(&dataset, &model, &args.output)
        .with_context(|| format!("exporting to {}", args.output.display()))?;

    for warning in &output.warnings {
        report(warning);
    }
    info!(
        pages = output.page_count,
        warnings = output.warnings.len(),
        "export finished"
    );
    println!(
        "Wrote {} page(s) to {}",
        output.page_count,
        args.output.display()
    );
    Ok(())
}

/// Apply this run's flags on top of the saved configuration.
fn effective_config(saved: &ExportConfig, args: &ExportArgs) -> Result<ExportConfig> {
    let mut config = saved.clone();
    if args.a4 {
        config.page = PageTemplate::a4();
    } else if let Some((width, height)) = args.page {
        config.page = PageTemplate::new(width, height)?;
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    Ok(config)
}

fn report(warning: &ExportWarning) {
    let human = humanize_error(&warning.error);
    let label = match human.severity {
        Severity::Recovered => "warning",
        Severity::Fatal => "error",
    };
    match warning.row {
        Some(row) => eprintln!("{label}: page {}: {}", row + 1, human.message),
        None => eprintln!("{label}: {}", human.message),
    }
    eprintln!("  {}", human.suggestion);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ExportArgs {
        ExportArgs {
            data: PathBuf::from("rows.xlsx"),
            output: PathBuf::from("out.pdf"),
            fonts: Vec::new(),
            page: None,
            a4: false,
            title: None,
        }
    }

    #[test]
    fn saved_config_is_used_without_flags() {
        let saved = ExportConfig::default();
        assert_eq!(effective_config(&saved, &args()).expect("config"), saved);
    }

    #[test]
    fn flags_override_saved_values() {
        let a4 = ExportArgs {
            a4: true,
            title: Some("Labels".into()),
            ..args()
        };
        let config = effective_config(&ExportConfig::default(), &a4).expect("config");
        assert_eq!(config.page, PageTemplate::a4());
        assert_eq!(config.title, "Labels");

        let custom = ExportArgs {
            page: Some((300.0, 150.0)),
            ..args()
        };
        let config = effective_config(&ExportConfig::default(), &custom).expect("config");
        assert_eq!(config.page.width_px, 300.0);
    }

    #[test]
    fn non_positive_page_is_rejected() {
        let bad = ExportArgs {
            page: Some((0.0, 100.0)),
            ..args()
        };
        assert!(effective_config(&ExportConfig::default(), &bad).is_err());
    }
}

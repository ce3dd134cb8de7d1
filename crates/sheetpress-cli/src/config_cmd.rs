// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `sheetpress config …` — show or change the saved export configuration.

use anyhow::{Result, bail};
use sheetpress_core::{ExportConfig, FontSpec, ImageSize, PageTemplate};

use crate::cli::ConfigCommand;
use crate::session::Session;

pub fn run(session: &mut Session, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(session.config())?);
        }
        ConfigCommand::Set { .. } => {
            let config = updated(session.config(), command)?;
            session.update_config(config)?;
            println!("Configuration saved");
        }
    }
    Ok(())
}

fn updated(current: &ExportConfig, command: &ConfigCommand) -> Result<ExportConfig> {
    let ConfigCommand::Set {
        page,
        font_family,
        font_size,
        barcode_box,
        title,
    } = command
    else {
        return Ok(current.clone());
    };
    if page.is_none()
        && font_family.is_none()
        && font_size.is_none()
        && barcode_box.is_none()
        && title.is_none()
    {
        bail!("nothing to change; pass at least one option");
    }

    let mut config = current.clone();
    if let Some((width, height)) = page {
        config.page = PageTemplate::new(*width, *height)?;
    }
    if font_family.is_some() || font_size.is_some() {
        let font = FontSpec::new(
            font_family
                .clone()
                .unwrap_or_else(|| config.default_font_family.clone()),
            font_size.unwrap_or(config.default_font_size),
        )?;
        config.default_font_family = font.family;
        config.default_font_size = font.size;
    }
    if let Some((width, height)) = barcode_box {
        config.barcode_box = ImageSize::new(*width, *height)?;
    }
    if let Some(title) = title {
        config.title = title.clone();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> ConfigCommand {
        ConfigCommand::Set {
            page: None,
            font_family: None,
            font_size: None,
            barcode_box: None,
            title: None,
        }
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(updated(&ExportConfig::default(), &set()).is_err());
    }

    #[test]
    fn values_are_validated_and_applied() {
        let command = ConfigCommand::Set {
            page: None,
            font_family: None,
            font_size: Some(11.0),
            barcode_box: Some((120.0, 40.0)),
            title: None,
        };
        let config = updated(&ExportConfig::default(), &command).expect("update");
        assert_eq!(config.default_font_family, "Arial");
        assert_eq!(config.default_font_size, 11.0);
        assert_eq!(config.barcode_box, ImageSize::new(120.0, 40.0).expect("size"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_font = ConfigCommand::Set {
            page: None,
            font_family: None,
            font_size: Some(0.0),
            barcode_box: None,
            title: None,
        };
        assert!(updated(&ExportConfig::default(), &zero_font).is_err());

        let flat_page = ConfigCommand::Set {
            page: Some((100.0, 0.0)),
            font_family: None,
            font_size: None,
            barcode_box: None,
            title: None,
        };
        assert!(updated(&ExportConfig::default(), &flat_page).is_err());
    }
}

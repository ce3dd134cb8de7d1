// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `sheetpress layout …` — the edits a canvas would make, one per invocation.
// Each edit loads the saved layout, applies the change and saves it again.
// An unreadable saved layout is never overwritten; only `reset` clears it.

use anyhow::{Context, Result, bail};
use sheetpress_core::{
    ExportConfig, FieldName, ImageIndex, ImageSize, LayoutModel, Position, RotationEdit,
};
use sheetpress_document::overlay::blob_from_bytes;
use tracing::debug;

use crate::cli::LayoutCommand;
use crate::session::Session;

pub fn run(session: &Session, command: &LayoutCommand) -> Result<()> {
    if let LayoutCommand::Reset = command {
        // Needs no readable layout: this is the way out of an unreadable one.
        session.reset_layout(&mut LayoutModel::new())?;
        println!("Layout reset");
        return Ok(());
    }

    let mut model = session.saved_layout().with_context(|| {
        format!(
            "the saved layout at {} is unreadable; run `sheetpress layout reset` to start over",
            session.layout_path().display()
        )
    })?;

    match command {
        LayoutCommand::Show => {
            println!("{}", sheetpress_settings::serialize(&model)?);
            return Ok(());
        }
        LayoutCommand::AddImage { file } => {
            let bytes =
                std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            let index = model.add_image(blob_from_bytes(bytes)?)?;
            session.save_layout(&model)?;
            println!("Added image {index}");
            return Ok(());
        }
        other => apply(&mut model, session.config(), other)?,
    }

    session.save_layout(&model)?;
    debug!("layout saved");
    Ok(())
}

/// Apply a single edit to `model`.
fn apply(model: &mut LayoutModel, config: &ExportConfig, command: &LayoutCommand) -> Result<()> {
    match command {
        LayoutCommand::SetField {
            name,
            x,
            y,
            rotation,
            font,
            size,
        } => {
            let name = FieldName::new(name.as_str())?;
            if x.is_none() && rotation.is_none() && font.is_none() && size.is_none() {
                bail!("nothing to change for field {name}; pass --x/--y, --rotation, --font or --size");
            }
            if let (Some(x), Some(y)) = (x, y) {
                model.set_field_position(name.clone(), Position::new(*x, *y)?)?;
            }
            if let Some(degrees) = rotation {
                let mut edit = RotationEdit::begin(name.clone());
                edit.update(*degrees);
                edit.commit(model)?;
            }
            if font.is_some() || size.is_some() {
                let current = model.resolve_field(&name, config).font;
                let family = font.as_deref().unwrap_or(&current.family);
                model.set_field_font(name, family, size.unwrap_or(current.size))?;
            }
        }
        LayoutCommand::MoveImage { index, x, y } => {
            let index = existing_image(model, *index)?;
            model.set_image_position(index, Position::new(*x, *y)?)?;
        }
        LayoutCommand::ResizeImage {
            index,
            width,
            height,
        } => {
            let index = existing_image(model, *index)?;
            model.set_image_size(index, ImageSize::new(*width, *height)?)?;
        }
        LayoutCommand::RemoveImage { index } => {
            if !model.remove_image(ImageIndex(*index)) {
                bail!("there is no image {index}");
            }
        }
        LayoutCommand::Show | LayoutCommand::Reset | LayoutCommand::AddImage { .. } => {}
    }
    Ok(())
}

fn existing_image(model: &LayoutModel, index: u32) -> Result<ImageIndex> {
    let index = ImageIndex(index);
    if !model.image_blobs().contains_key(&index) {
        bail!("there is no image {index}");
    }
    Ok(index)
}

// Guide / reference rendering: blit one atlas cell, scaled to fill a surface.

use crate::atlas::{single_char, AtlasSheet, CellRect, GlyphAtlas};
use crate::error::Error;
use crate::types::{pack, FrameBuffer};
use image::imageops::{self, FilterType};

/// Clear `surface` and draw the guide for `text`.
///
/// * empty `text`: clear only
/// * more than one character: `InvalidCharacter`, surface untouched
/// * character missing from the atlas: clear only
/// * sheet still loading: `AssetNotReady`, surface untouched
pub fn render_guide(
    surface: &mut FrameBuffer,
    atlas: &GlyphAtlas,
    sheet: &AtlasSheet,
    text: &str,
) -> Result<(), Error> {
    if text.is_empty() {
        surface.clear();
        return Ok(());
    }
    let c = single_char(text)?;
    let cell = match atlas.locate_char(c) {
        Ok(cell) => cell,
        Err(Error::CharacterNotFound(c)) => {
            log::warn!("No glyph for {c:?} in the {} sheet, nothing to draw", sheet.name);
            surface.clear();
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let scaled = rasterize_cell(sheet, cell, surface.width, surface.height)?;
    surface.pixels.copy_from_slice(&scaled.pixels);
    Ok(())
}

/// Crop `cell` from the sheet and scale it to exactly `width` x `height`.
pub fn rasterize_cell(
    sheet: &AtlasSheet,
    cell: CellRect,
    width: usize,
    height: usize,
) -> Result<FrameBuffer, Error> {
    let mut out = FrameBuffer::new(width, height);
    if width == 0 || height == 0 {
        return Ok(out);
    }

    let cropped = sheet.cell_image(cell)?;
    let (w, h) = (width as u32, height as u32);
    let scaled = if cropped.dimensions() == (w, h) {
        cropped
    } else {
        imageops::resize(&cropped, w, h, FilterType::Triangle)
    };

    for (dst, px) in out.pixels.iter_mut().zip(scaled.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = pack(r, g, b, a);
    }
    Ok(out)
}

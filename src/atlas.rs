// Glyph atlas indexing: character -> cell rectangle inside a sprite sheet.
// Both sheets (stroke guide and clean reference) share one layout.

use crate::error::Error;
use image::RgbaImage;

/// Rectangle in atlas-image pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct GlyphAtlas {
    alphabet: Vec<char>,
    cell_width: u32,
    cell_height: u32,
}

impl GlyphAtlas {
    pub fn new(alphabet: &str, cell_width: u32, cell_height: u32) -> Self {
        Self { alphabet: alphabet.chars().collect(), cell_width, cell_height }
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// First occurrence wins.
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.alphabet.iter().position(|&a| a == c)
    }

    pub fn contains(&self, c: char) -> bool {
        self.index_of(c).is_some()
    }

    /// Locate `text` (which must hold exactly one character) in the sheet.
    pub fn locate(&self, text: &str) -> Result<CellRect, Error> {
        let c = single_char(text)?;
        self.locate_char(c)
    }

    pub fn locate_char(&self, c: char) -> Result<CellRect, Error> {
        let index = self.index_of(c).ok_or(Error::CharacterNotFound(c))?;
        // A cell past u32::MAX cannot be on any sheet
        let x = u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(self.cell_width))
            .ok_or(Error::CharacterNotFound(c))?;
        Ok(CellRect {
            x,
            y: 0,
            width: self.cell_width,
            height: self.cell_height,
        })
    }
}

/// Exactly one character, or `InvalidCharacter`.
pub fn single_char(text: &str) -> Result<char, Error> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::InvalidCharacter(text.to_string())),
    }
}

/// One decoded sprite sheet. `image` stays `None` until the loader delivers it.
pub struct AtlasSheet {
    pub name: &'static str,
    image: Option<RgbaImage>,
}

impl AtlasSheet {
    pub fn pending(name: &'static str) -> Self {
        Self { name, image: None }
    }

    pub fn ready(name: &'static str, image: RgbaImage) -> Self {
        Self { name, image: Some(image) }
    }

    pub fn set_image(&mut self, image: RgbaImage) {
        self.image = Some(image);
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Result<&RgbaImage, Error> {
        self.image.as_ref().ok_or(Error::AssetNotReady(self.name))
    }

    /// Copy the cell out of the sheet. Fails when the sheet is too small for it.
    pub fn cell_image(&self, cell: CellRect) -> Result<RgbaImage, Error> {
        let image = self.image()?;
        let fits = |start: u32, len: u32, limit: u32| start.checked_add(len).is_some_and(|end| end <= limit);
        if !fits(cell.x, cell.width, image.width()) || !fits(cell.y, cell.height, image.height()) {
            return Err(Error::AssetLoad(format!(
                "{}: cell at x={} does not fit in a {}x{} sheet",
                self.name,
                cell.x,
                image.width(),
                image.height()
            )));
        }
        Ok(image::imageops::crop_imm(image, cell.x, cell.y, cell.width, cell.height).to_image())
    }
}

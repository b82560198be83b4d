// Core types shared by the capture, rendering and scoring stages.

use crate::error::Error;

/// Packed pixel value meaning "nothing painted here" (cleared canvas).
pub const TRANSPARENT: u32 = 0x0000_0000;

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // surface width in device pixels
    pub height: usize,     // surface height in device pixels
    pub pixels: Vec<u32>,  // each entry is 0xAARRGGBB, row-major
}

impl FrameBuffer {
    /// A fully transparent buffer, like a freshly created canvas.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![TRANSPARENT; width * height] }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Wipe every pixel back to transparent. The allocation is kept.
    pub fn clear(&mut self) {
        self.pixels.fill(TRANSPARENT);
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == TRANSPARENT)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Overwrite one pixel; writes outside the buffer are dropped.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.pixels[y * self.width + x] = color;
    }

    pub fn ensure_same_size(&self, other: &FrameBuffer) -> Result<(), Error> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }
}

/// Split 0xAARRGGBB into (r, g, b, a).
#[inline]
pub fn unpack(px: u32) -> (u8, u8, u8, u8) {
    (
        ((px >> 16) & 0xFF) as u8,
        ((px >> 8) & 0xFF) as u8,
        (px & 0xFF) as u8,
        ((px >> 24) & 0xFF) as u8,
    )
}

#[inline]
pub fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Surface-relative pointer position in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Live pen state. Written only by the pointer controller; the freehand
/// renderer advances `last` after painting a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrokeState {
    pub capturing: bool,
    pub last: Position,
    pub current: Position,
    pub strokes: u32,
}

impl StrokeState {
    pub fn reset(&mut self) {
        *self = StrokeState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack_agree() {
        let px = pack(0x12, 0x34, 0x56, 0x78);
        assert_eq!(px, 0x7812_3456);
        assert_eq!(unpack(px), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn put_outside_bounds_is_ignored() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.put(-1, 0, 0xFF00_0000);
        fb.put(4, 0, 0xFF00_0000);
        fb.put(0, 3, 0xFF00_0000);
        assert!(fb.is_blank());

        fb.put(3, 2, 0xFF00_0000);
        assert_eq!(fb.get(3, 2), Some(0xFF00_0000));
        fb.clear();
        assert!(fb.is_blank());
        assert_eq!(fb.pixels.len(), 12);
    }

    #[test]
    fn size_check_reports_both_dimensions() {
        let a = FrameBuffer::new(2, 2);
        let b = FrameBuffer::new(3, 2);
        assert_eq!(
            a.ensure_same_size(&b),
            Err(Error::DimensionMismatch { expected: (2, 2), actual: (3, 2) })
        );
    }
}

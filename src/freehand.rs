// Freehand pen: each frame, while capturing, paint the segment last -> current
// as a round-capped thick line, then advance last.
// Visual: the learner's ink follows the pointer with smooth rounded ends.

use crate::types::{pack, unpack, FrameBuffer, Position, StrokeState};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen {
    pub width: f32, // full line width in device pixels
    pub color: u32, // 0xAARRGGBB
}

impl Default for Pen {
    fn default() -> Self {
        Self { width: 40.0, color: 0xFF00_0000 }
    }
}

pub struct FreehandRenderer {
    pen: Pen,
}

impl FreehandRenderer {
    pub fn new(pen: Pen) -> Self {
        Self { pen }
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    /// One display tick. Returns true when ink was laid down.
    /// Not capturing -> nothing happens, so this is safe to call every frame.
    pub fn paint(&self, state: &mut StrokeState, surface: &mut FrameBuffer) -> bool {
        if !state.capturing {
            return false;
        }
        draw_segment(surface, state.last, state.current, &self.pen);
        state.last = state.current;
        true
    }
}

/// Rasterize a capsule (segment swept by a disc of radius width/2).
/// Edge pixels get partial coverage for a one pixel soft rim.
pub fn draw_segment(fb: &mut FrameBuffer, from: Position, to: Position, pen: &Pen) {
    let r = pen.width * 0.5;
    if r <= 0.0 || fb.width == 0 || fb.height == 0 {
        return;
    }

    // Scan just the bounding box of the capsule, clamped to the surface
    let min_x = (from.x.min(to.x) - r - 1.0).floor().max(0.0) as usize;
    let min_y = (from.y.min(to.y) - r - 1.0).floor().max(0.0) as usize;
    let max_x = (from.x.max(to.x) + r + 1.0).ceil().min((fb.width - 1) as f32);
    let max_y = (from.y.max(to.y) + r + 1.0).ceil().min((fb.height - 1) as f32);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }
    let (max_x, max_y) = (max_x as usize, max_y as usize);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            // Sample at the pixel center
            let p = Position::new(x as f32 + 0.5, y as f32 + 0.5);
            let d = distance_to_segment(p, from, to);
            let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let idx = y * fb.width + x;
            fb.pixels[idx] = source_over(pen.color, coverage, fb.pixels[idx]);
        }
    }
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len2 = abx * abx + aby * aby;
    let t = if len2 <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * abx, a.y + t * aby);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Canvas "source-over" on straight (non-premultiplied) RGBA.
fn source_over(src: u32, coverage: f32, dst: u32) -> u32 {
    let (sr, sg, sb, sa) = unpack(src);
    let (dr, dg, db, da) = unpack(dst);

    let a_s = sa as f32 / 255.0 * coverage;
    let a_d = da as f32 / 255.0;
    let a_o = a_s + a_d * (1.0 - a_s);
    if a_o <= 0.0 {
        return dst;
    }

    let mix = |s: u8, d: u8| -> u8 {
        let c = (s as f32 * a_s + d as f32 * a_d * (1.0 - a_s)) / a_o;
        c.round().clamp(0.0, 255.0) as u8
    };
    let a = (a_o * 255.0).round().clamp(0.0, 255.0) as u8;
    pack(mix(sr, dr), mix(sg, dg), mix(sb, db), a)
}

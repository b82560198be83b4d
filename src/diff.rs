// Perceptual pixel difference between two equally sized surfaces.
//
// Colors are compared in YIQ space; semi-transparent pixels are blended onto
// white first. A pixel whose delta exceeds the threshold is skipped when it
// looks like anti-aliasing in either image (a brightness gradient between
// neighbours that both have flat siblings), unless `include_anti_aliased`.

use crate::atlas::{AtlasSheet, GlyphAtlas};
use crate::error::Error;
use crate::glyph::rasterize_cell;
use crate::types::{pack, unpack, FrameBuffer};

/// Largest possible YIQ delta between two colors.
const MAX_YIQ_DELTA: f64 = 35215.0;

const DIFF_COLOR: u32 = 0xFFFF_0000; // mismatch: red
const AA_COLOR: u32 = 0xFFFF_FF00; // anti-aliased: yellow
const FADE_ALPHA: f64 = 0.1; // unchanged pixels are shown as faded grey

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffOptions {
    /// 0..=1, smaller is stricter.
    pub threshold: f64,
    pub include_anti_aliased: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { threshold: 0.1, include_anti_aliased: false }
    }
}

/// Number of pixels that differ between `a` and `b`.
/// When `output` is given it receives a visual diff (same size as the inputs).
pub fn pixel_difference(
    a: &FrameBuffer,
    b: &FrameBuffer,
    mut output: Option<&mut FrameBuffer>,
    options: DiffOptions,
) -> Result<usize, Error> {
    a.ensure_same_size(b)?;
    if let Some(out) = output.as_deref() {
        a.ensure_same_size(out)?;
    }

    let (width, height) = a.dimensions();

    // Fast path: identical buffers
    if a.pixels == b.pixels {
        if let Some(out) = output.as_deref_mut() {
            for (dst, &px) in out.pixels.iter_mut().zip(&a.pixels) {
                *dst = gray_pixel(px);
            }
        }
        return Ok(0);
    }

    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let mut diff = 0;

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let delta = color_delta(a.pixels[i], b.pixels[i], false);

            let marker = if delta.abs() > max_delta {
                if !options.include_anti_aliased
                    && (antialiased(a, x, y, b) || antialiased(b, x, y, a))
                {
                    AA_COLOR
                } else {
                    diff += 1;
                    DIFF_COLOR
                }
            } else {
                gray_pixel(a.pixels[i])
            };

            if let Some(out) = output.as_deref_mut() {
                out.pixels[i] = marker;
            }
        }
    }

    Ok(diff)
}

/// Rasterize the reference cell for `text` into a scratch buffer the size of
/// `surface` and count differing pixels. `surface` is only read.
pub fn calculate_difference(
    surface: &FrameBuffer,
    atlas: &GlyphAtlas,
    reference: &AtlasSheet,
    text: &str,
    options: DiffOptions,
) -> Result<usize, Error> {
    let cell = atlas.locate(text)?;
    let scratch = rasterize_cell(reference, cell, surface.width, surface.height)?;
    pixel_difference(surface, &scratch, None, options)
}

fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

/// Channels blended onto white.
fn over_white(px: u32) -> (f64, f64, f64) {
    let (r, g, b, a) = unpack(px);
    let (r, g, b) = (r as f64, g as f64, b as f64);
    if a == 255 {
        return (r, g, b);
    }
    let a = a as f64 / 255.0;
    (blend(r, a), blend(g, a), blend(b, a))
}

/// Signed YIQ distance; negative when `p1` is brighter than `p2`.
/// With `y_only` just the brightness difference is returned.
fn color_delta(p1: u32, p2: u32, y_only: bool) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let (r1, g1, b1) = over_white(p1);
    let (r2, g2, b2) = over_white(p2);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;
    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 { -delta } else { delta }
}

/// Inclusive 3x3 neighbourhood bounds around (x, y), clamped to the image.
fn neighbourhood(fb: &FrameBuffer, x: usize, y: usize) -> (usize, usize, usize, usize) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(fb.width - 1),
        (y + 1).min(fb.height - 1),
    )
}

/// Is (x1, y1) in `img` an anti-aliased pixel? `other` is the image it is compared with.
fn antialiased(img: &FrameBuffer, x1: usize, y1: usize, other: &FrameBuffer) -> bool {
    let (x0, y0, x2, y2) = neighbourhood(img, x1, y1);
    let center = img.pixels[y1 * img.width + x1];

    // Pixels on the border count as having one identical neighbour already
    let mut zeroes = usize::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);
    let (mut min, mut max) = (0.0_f64, 0.0_f64);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0, 0, 0, 0);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }

            let delta = color_delta(center, img.pixels[y * img.width + x], true);
            if delta == 0.0 {
                zeroes += 1;
                // More than two identical siblings: a flat area, not an edge
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_x = x;
                min_y = y;
            } else if delta > max {
                max = delta;
                max_x = x;
                max_y = y;
            }
        }
    }

    // Anti-aliasing sits between a darker and a brighter neighbour
    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_x, min_y) && has_many_siblings(other, min_x, min_y))
        || (has_many_siblings(img, max_x, max_y) && has_many_siblings(other, max_x, max_y))
}

/// Does (x1, y1) have at least three identical neighbours?
fn has_many_siblings(img: &FrameBuffer, x1: usize, y1: usize) -> bool {
    let (x0, y0, x2, y2) = neighbourhood(img, x1, y1);
    let center = img.pixels[y1 * img.width + x1];
    let mut zeroes = usize::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }
            if img.pixels[y * img.width + x] == center {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }
    false
}

/// Faded grey version of a pixel for the unchanged areas of the diff image.
fn gray_pixel(px: u32) -> u32 {
    let (r, g, b, a) = unpack(px);
    let y = rgb2y(r as f64, g as f64, b as f64);
    let v = blend(y, FADE_ALPHA * a as f64 / 255.0).round().clamp(0.0, 255.0) as u8;
    pack(v, v, v, 255)
}

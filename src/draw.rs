// Window + software drawing utilities for the practice front-end.
// Visual effects provided here:
// 1) A window showing the drawing surface composited onto white paper.
// 2) Mouse button edges turned into press / move / release pointer phases.
// 3) A tiny 5x7 bitmap font for the HUD line.

use crate::error::Error;
use crate::input::PointerPhase;
use crate::types::{unpack, FrameBuffer};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,          // the on-screen window you see
    left_was_down: bool,     // button state last frame, for press/release edges
    last_mouse: (f32, f32),  // last known cursor position
}

impl Drawer {
    /// One window pixel per surface pixel. The display tick is capped at 60 fps,
    /// which also paces the session's repaint loop.
    pub fn new(title: &str, surface: (usize, usize)) -> Result<Self, Error> {
        let (width, height) = surface;
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(format!("{title}: {e}")))?;
        window.set_target_fps(60);
        Ok(Self { window, left_was_down: false, last_mouse: (0.0, 0.0) })
    }

    /// Show a composited 0x00RRGGBB screen; also pumps window events.
    pub fn present(&mut self, screen: &FrameBuffer) -> Result<(), Error> {
        let (w, h) = screen.dimensions();
        self.window
            .update_with_buffer(&screen.pixels, w, h)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// The practice loop runs until the window is closed.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Pointer phase for this frame, in window coordinates.
    /// Button down edge -> Press, held -> Move, up edge -> Release.
    pub fn poll_pointer(&mut self) -> Option<(PointerPhase, f32, f32)> {
        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            self.last_mouse = (x, y);
        }
        let (x, y) = self.last_mouse;
        let down = self.window.get_mouse_down(MouseButton::Left);
        let phase = pointer_phase(self.left_was_down, down);
        self.left_was_down = down;
        phase.map(|p| (p, x, y))
    }

    // C: wipe the drawing and start the letter again
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    // R: random letter
    pub fn r_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }

    // D: toggle the difference overlay
    pub fn d_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::D, KeyRepeat::No)
    }

    // Enter: check the drawing
    pub fn enter_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::Enter, KeyRepeat::No)
    }
}

fn pointer_phase(was_down: bool, down: bool) -> Option<PointerPhase> {
    match (was_down, down) {
        (false, true) => Some(PointerPhase::Press),
        (true, true) => Some(PointerPhase::Move),
        (true, false) => Some(PointerPhase::Release),
        (false, false) => None,
    }
}

/// Blend an RGBA surface onto white paper into a 0x00RRGGBB screen buffer.
pub fn composite_over_white(src: &FrameBuffer, screen: &mut FrameBuffer) -> Result<(), Error> {
    src.ensure_same_size(screen)?;
    for (dst, &px) in screen.pixels.iter_mut().zip(&src.pixels) {
        let (r, g, b, a) = unpack(px);
        let a = a as u32;
        let over = |c: u8| (c as u32 * a + 255 * (255 - a) + 127) / 255;
        *dst = (over(r) << 16) | (over(g) << 8) | over(b);
    }
    Ok(())
}

/* ---------- HUD font: stroke/star counters and key hints ---------- */

/// Rows of a HUD glyph, top to bottom, 5 pixels wide (bit 4 is the left column).
/// Only what the status and hint lines print is covered: digits, the capitals
/// spelling STROKES, STARS and the key names, plus `| : . / -`. Lower case is
/// folded to upper case; anything else is skipped.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // STROKES, STARS, ENTER: CHECK, C: CLEAR, R: RANDOM, D: DIFF
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '-' => g!(0b00000,0b00000,0b00000,0b01110,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// One HUD glyph with its top-left at (x, y), over a white offset so it reads
/// on both dark ink and the light guide.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, c) in [(1, 0x00FF_FFFF), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    fb.put(x + rx + offset, y + ry as i32 + offset, c);
                }
            }
        }
    }
}

/// A HUD line, advancing 6 pixels per character. Unsupported characters
/// leave a gap.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_edges_map_to_phases() {
        assert_eq!(pointer_phase(false, true), Some(PointerPhase::Press));
        assert_eq!(pointer_phase(true, true), Some(PointerPhase::Move));
        assert_eq!(pointer_phase(true, false), Some(PointerPhase::Release));
        assert_eq!(pointer_phase(false, false), None);
    }

    #[test]
    fn transparent_becomes_white_paper() {
        let mut src = FrameBuffer::new(3, 1);
        src.pixels = vec![0x0000_0000, 0xFF00_0000, 0x80FF_0000];
        let mut screen = FrameBuffer::new(3, 1);
        composite_over_white(&src, &mut screen).unwrap();
        assert_eq!(screen.pixels[0], 0x00FF_FFFF);
        assert_eq!(screen.pixels[1], 0x0000_0000);
        // Half red over white: full red channel, others about half
        let (r, g, b, _) = unpack(screen.pixels[2]);
        assert_eq!(r, 255);
        assert!((126..=128).contains(&g) && g == b);
    }

    #[test]
    fn hud_glyphs_cover_the_status_line() {
        for ch in "STROKES 2/3 | STARS - | ENTER: CHECK  C: CLEAR  R: RANDOM  D: DIFF".chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch:?}");
        }
        assert_eq!(glyph5x7('s'), glyph5x7('S'));
        assert!(glyph5x7('Q').is_none());

        let mut fb = FrameBuffer::new(40, 10);
        draw_text_5x7(&mut fb, 1, 1, "OK", 0x0011_2233);
        assert!(fb.pixels.contains(&0x0011_2233));
    }
}

// One learner's practice session.
//
// Idle -> Ready -> Capturing -> Scored, and back to Ready on a new letter or
// a clear. The session owns the drawing surface, the stroke state, the repaint
// subscription and both atlas sheets; nothing here is global.

use crate::assets::ImageLoader;
use crate::atlas::{single_char, AtlasSheet, GlyphAtlas};
use crate::config::Config;
use crate::diff::{calculate_difference, pixel_difference, DiffOptions};
use crate::error::Error;
use crate::frame::{CancelFrames, FrameLoop};
use crate::freehand::{draw_segment, FreehandRenderer, Pen};
use crate::glyph::{rasterize_cell, render_guide};
use crate::input::{Observer, PointerCapture, PointerEvent, PointerPhase, SurfaceRect};
use crate::scoring::{
    calculate_score, Evaluation, ScoringPolicy, StarThresholds, Stars, StrokeBudget,
};
use crate::types::{FrameBuffer, StrokeState};
use image::RgbaImage;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,      // no character selected
    Ready,     // guide shown, nothing drawn yet
    Capturing, // at least one stroke, not scored
    Scored,    // score held for display
}

pub struct PracticeSession {
    atlas: GlyphAtlas,
    guide: AtlasSheet,
    reference: AtlasSheet,
    guide_loader: Option<ImageLoader>,
    reference_loader: Option<ImageLoader>,

    surface_size: (usize, usize),
    surface: Option<FrameBuffer>,
    capture: PointerCapture,
    renderer: FreehandRenderer,
    repaint: Option<(FrameLoop, CancelFrames)>,

    policy: ScoringPolicy,
    diff_options: DiffOptions,

    character: Option<char>,
    state: SessionState,
    guide_pending: bool, // guide must be (re)drawn once surface and sheet allow
    evaluation: Option<Evaluation>,
    live_ratio: Option<f64>,
}

impl PracticeSession {
    pub fn new(
        atlas: GlyphAtlas,
        guide: AtlasSheet,
        reference: AtlasSheet,
        surface_size: (usize, usize),
        pen: Pen,
        policy: ScoringPolicy,
        diff_options: DiffOptions,
    ) -> Self {
        Self {
            atlas,
            guide,
            reference,
            guide_loader: None,
            reference_loader: None,
            surface_size,
            surface: None,
            capture: PointerCapture::new(),
            renderer: FreehandRenderer::new(pen),
            repaint: None,
            policy,
            diff_options,
            character: None,
            state: SessionState::Idle,
            guide_pending: false,
            evaluation: None,
            live_ratio: None,
        }
    }

    /// Build a session from config and start loading both sheets in the background.
    pub fn from_config(config: &Config) -> Self {
        let atlas = GlyphAtlas::new(
            &config.atlas.alphabet,
            config.atlas.cell_width,
            config.atlas.cell_height,
        );
        let policy = ScoringPolicy::new(
            StarThresholds { three: config.scoring.three_stars, two: config.scoring.two_stars },
            StrokeBudget::new(config.stroke_budgets()),
        );
        let mut session = Self::new(
            atlas,
            AtlasSheet::pending("guide"),
            AtlasSheet::pending("reference"),
            config.surface_size(),
            Pen { width: config.pen.width, color: config.pen.color },
            policy,
            DiffOptions {
                threshold: config.scoring.threshold,
                include_anti_aliased: config.scoring.include_anti_aliased,
            },
        );
        session.guide_loader =
            Some(ImageLoader::spawn(config.resolve_asset_path(&config.atlas.guide_image)));
        session.reference_loader =
            Some(ImageLoader::spawn(config.resolve_asset_path(&config.atlas.reference_image)));
        session
    }

    /* ----------------------------- assets ----------------------------- */

    /// Pick up finished background loads. Cheap; called every frame.
    pub fn poll_assets(&mut self) {
        if let Some(result) = self.guide_loader.as_mut().and_then(ImageLoader::poll) {
            self.guide_loader = None;
            match result {
                Ok(image) => self.install_guide(image),
                Err(e) => log::error!("Guide sheet unavailable, guide will not be shown: {e}"),
            }
        }
        if let Some(result) = self.reference_loader.as_mut().and_then(ImageLoader::poll) {
            self.reference_loader = None;
            match result {
                Ok(image) => self.install_reference(image),
                Err(e) => log::error!("Reference sheet unavailable, scoring disabled: {e}"),
            }
        }
    }

    /// Guide sheet finished loading: draw any guide that was waiting for it.
    pub fn install_guide(&mut self, image: RgbaImage) {
        log::info!("Guide sheet loaded ({}x{})", image.width(), image.height());
        self.guide.set_image(image);
        if self.character.is_some() {
            self.guide_pending = true;
        }
        self.redraw_guide();
    }

    pub fn install_reference(&mut self, image: RgbaImage) {
        log::info!("Reference sheet loaded ({}x{})", image.width(), image.height());
        self.reference.set_image(image);
    }

    /* ----------------------------- surface ----------------------------- */

    /// Create the drawing surface, hook up pointer listeners and the repaint
    /// loop. Replacing a live surface tears the old one down first.
    pub fn attach_surface(&mut self, rect: SurfaceRect) {
        if self.surface.is_some() {
            self.detach_surface();
        }
        let (w, h) = self.surface_size;
        self.surface = Some(FrameBuffer::new(w, h));
        self.capture.attach(rect);
        self.repaint = Some(FrameLoop::subscribe());
        log::info!("Drawing surface attached ({w}x{h})");

        self.guide_pending = true;
        self.redraw_guide();
    }

    pub fn detach_surface(&mut self) {
        if let Some((_, cancel)) = self.repaint.take() {
            cancel.cancel();
        }
        self.capture.detach();
        if self.surface.take().is_some() {
            log::info!("Drawing surface detached");
        }
    }

    /// One display tick: pick up assets, then paint the pending pen segment.
    pub fn frame(&mut self) {
        self.poll_assets();

        let Some((frames, _)) = self.repaint.as_mut() else {
            return;
        };
        if !frames.next_frame() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            self.renderer.paint(self.capture.state_mut(), surface);
        }
    }

    /* ----------------------------- input ----------------------------- */

    /// The observer sees a release only after the tail of that stroke is on
    /// the surface.
    pub fn set_pointer_observer(&mut self, observer: Observer) {
        self.capture.set_observer(observer);
    }

    pub fn pointer_mouse(&mut self, phase: PointerPhase, client_x: f32, client_y: f32) {
        if phase == PointerPhase::Release {
            self.flush_pending_segment();
        }
        let event = self.capture.mouse(phase, client_x, client_y);
        self.after_pointer(event);
    }

    pub fn pointer_touch(&mut self, phase: PointerPhase, touches: &[(f32, f32)]) {
        if phase == PointerPhase::Release {
            self.flush_pending_segment();
        }
        let event = self.capture.touch(phase, touches);
        self.after_pointer(event);
    }

    /// Paint the segment the frame loop has not reached yet, so a stroke that
    /// ends between frames is not cut short.
    fn flush_pending_segment(&mut self) {
        let Some(surface) = self.surface.as_mut() else { return };
        let state = self.capture.state_mut();
        if state.capturing && state.last != state.current {
            draw_segment(surface, state.last, state.current, &self.renderer.pen());
            state.last = state.current;
        }
    }

    fn after_pointer(&mut self, event: Option<PointerEvent>) {
        if event.is_some_and(|e| e.phase == PointerPhase::Release) {
            self.stroke_completed();
        }
    }

    fn stroke_completed(&mut self) {
        let strokes = self.capture.state().strokes;
        log::debug!("Stroke {strokes} completed");
        match self.state {
            SessionState::Idle => {}
            SessionState::Scored => {
                // Drawing again makes the held score stale
                self.evaluation = None;
                self.state = SessionState::Capturing;
            }
            SessionState::Ready | SessionState::Capturing => {
                self.state = SessionState::Capturing;
            }
        }
        self.live_ratio = self.measure_ratio().ok();
    }

    /* ----------------------------- lifecycle ----------------------------- */

    /// Switch to a new letter (any state -> Ready). An empty string deselects
    /// (-> Idle). More than one character is a caller bug.
    pub fn set_character(&mut self, text: &str) -> Result<(), Error> {
        let character = if text.is_empty() { None } else { Some(single_char(text)?) };
        if let Some(c) = character {
            if !self.atlas.contains(c) {
                log::warn!("Character {c:?} is not in the alphabet, guide will be blank");
            }
        }
        log::info!("Practice letter: {character:?}");

        self.character = character;
        self.reset_drawing();
        Ok(())
    }

    /// Wipe the drawing and start the same letter over (any state -> Ready).
    pub fn clear(&mut self) {
        self.reset_drawing();
    }

    /// Uniform pick from the alphabet, then behaves like `set_character`.
    pub fn pick_random_character<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<char> {
        let c = *self.atlas.alphabet().choose(rng)?;
        self.character = Some(c);
        log::info!("Practice letter (random): {c:?}");
        self.reset_drawing();
        Some(c)
    }

    fn reset_drawing(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        self.restart_letter();
        self.guide_pending = true;
        self.redraw_guide();
    }

    /// Forget strokes and any score; the letter stays.
    fn restart_letter(&mut self) {
        self.capture.reset();
        self.evaluation = None;
        self.live_ratio = None;
        self.state = if self.character.is_some() { SessionState::Ready } else { SessionState::Idle };
    }

    /// Draw the guide if one is owed and everything it needs is there.
    /// Missing surface or sheet leaves it owed for a later retry.
    fn redraw_guide(&mut self) {
        if !self.guide_pending {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            log::debug!("Guide deferred: no surface yet");
            return;
        };
        let text = self.character.map(String::from).unwrap_or_default();

        match render_guide(surface, &self.atlas, &self.guide, &text) {
            Ok(()) => {
                // Ink and score from before the redraw are gone with the clear
                self.guide_pending = false;
                self.restart_letter();
            }
            Err(Error::AssetNotReady(name)) => {
                log::debug!("Guide deferred: {name} sheet still loading");
            }
            Err(e) => {
                log::error!("Guide not shown: {e}");
                self.guide_pending = false;
            }
        }
    }

    /* ----------------------------- scoring ----------------------------- */

    /// "Check my drawing". `None` when nothing can be scored (no letter, no
    /// surface, reference not loaded, letter not in the atlas).
    pub fn evaluate(&mut self) -> Option<Evaluation> {
        let c = self.character?;
        let difference = match self.calculate_pixel_difference() {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Score unavailable: {e}");
                return None;
            }
        };
        let area = self.surface.as_ref().map_or(0, FrameBuffer::area);
        let strokes = self.capture.state().strokes;
        let evaluation = self.policy.evaluate(c, difference, area, strokes)?;

        log::info!(
            "Evaluated {c:?}: difference={difference} ratio={:.3} strokes={strokes}/{} stars={}",
            evaluation.ratio,
            evaluation.max_strokes.map_or_else(|| "-".to_string(), |m| m.to_string()),
            evaluation.stars.get()
        );
        self.evaluation = Some(evaluation);
        self.state = SessionState::Scored;
        Some(evaluation)
    }

    /// Raw difference between the surface and the reference glyph.
    pub fn calculate_pixel_difference(&self) -> Result<usize, Error> {
        let surface = self.surface.as_ref().ok_or(Error::SurfaceUnavailable)?;
        let text = self.character.map(String::from).unwrap_or_default();
        calculate_difference(surface, &self.atlas, &self.reference, &text, self.diff_options)
    }

    /// Visual diff of surface vs. reference, for a debug overlay.
    pub fn difference_overlay(&self) -> Result<FrameBuffer, Error> {
        let surface = self.surface.as_ref().ok_or(Error::SurfaceUnavailable)?;
        let text = self.character.map(String::from).unwrap_or_default();
        let cell = self.atlas.locate(&text)?;
        let scratch = rasterize_cell(&self.reference, cell, surface.width, surface.height)?;
        let mut overlay = FrameBuffer::new(surface.width, surface.height);
        pixel_difference(surface, &scratch, Some(&mut overlay), self.diff_options)?;
        Ok(overlay)
    }

    fn measure_ratio(&self) -> Result<f64, Error> {
        let difference = self.calculate_pixel_difference()?;
        let area = self.surface.as_ref().map_or(0, FrameBuffer::area);
        calculate_score(self.character, difference, area)
            .ok_or(Error::SurfaceUnavailable)
    }

    /* ----------------------------- accessors ----------------------------- */

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn character(&self) -> Option<char> {
        self.character
    }

    pub fn alphabet(&self) -> &[char] {
        self.atlas.alphabet()
    }

    pub fn stroke_state(&self) -> &StrokeState {
        self.capture.state()
    }

    /// Budget for the current letter, for callers that want the second signal.
    pub fn max_strokes(&self) -> Option<u32> {
        self.character.and_then(|c| self.policy.budget().max_strokes(c))
    }

    /// Score held for display; only present in `Scored`.
    pub fn stars(&self) -> Option<Stars> {
        self.evaluation.map(|e| e.stars)
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Ratio measured after the most recent stroke.
    pub fn live_ratio(&self) -> Option<f64> {
        self.live_ratio
    }

    pub fn surface_snapshot(&self) -> Option<&FrameBuffer> {
        self.surface.as_ref()
    }

    pub fn is_repainting(&self) -> bool {
        self.repaint.as_ref().is_some_and(|(frames, _)| frames.is_live())
    }

    pub fn guide_pending(&self) -> bool {
        self.guide_pending
    }
}

impl Drop for PracticeSession {
    fn drop(&mut self) {
        self.detach_surface();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    const GUIDE_O: u32 = 0xFFDD_DDDD;
    const GUIDE_B: u32 = 0xFFAA_CCFF;
    const INK: u32 = 0xFF00_0000;

    // 4x8 cells for "OB"; surface is 2x -> 8x16
    fn guide_image() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 { Rgba([0xDD, 0xDD, 0xDD, 0xFF]) } else { Rgba([0xAA, 0xCC, 0xFF, 0xFF]) }
        })
    }

    // Both reference glyphs are solid ink, so a fully inked surface is a perfect trace
    fn reference_image() -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0xFF]))
    }

    fn session_with(guide: AtlasSheet, reference: AtlasSheet) -> PracticeSession {
        session_with_pen(guide, reference, 40.0)
    }

    fn session_with_pen(guide: AtlasSheet, reference: AtlasSheet, width: f32) -> PracticeSession {
        let policy = ScoringPolicy::new(
            StarThresholds::default(),
            StrokeBudget::new(HashMap::from([('O', 1), ('B', 2)])),
        );
        PracticeSession::new(
            GlyphAtlas::new("OB", 4, 8),
            guide,
            reference,
            (8, 16),
            Pen { width, color: INK },
            policy,
            DiffOptions::default(),
        )
    }

    fn session() -> PracticeSession {
        let mut s = session_with(
            AtlasSheet::ready("guide", guide_image()),
            AtlasSheet::ready("reference", reference_image()),
        );
        s.attach_surface(SurfaceRect::default());
        s
    }

    fn stroke(s: &mut PracticeSession, from: (f32, f32), to: (f32, f32)) {
        s.pointer_mouse(PointerPhase::Press, from.0, from.1);
        s.frame();
        s.pointer_mouse(PointerPhase::Move, to.0, to.1);
        s.frame();
        s.pointer_mouse(PointerPhase::Release, to.0, to.1);
    }

    fn surface_is(s: &PracticeSession, color: u32) -> bool {
        s.surface_snapshot().unwrap().pixels.iter().all(|&p| p == color)
    }

    #[test]
    fn starts_idle_and_set_character_renders_guide() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.surface_snapshot().unwrap().is_blank());

        s.set_character("O").unwrap();
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.character(), Some('O'));
        assert!(surface_is(&s, GUIDE_O));
        assert_eq!(s.max_strokes(), Some(1));
    }

    #[test]
    fn strokes_move_to_capturing() {
        let mut s = session();
        s.set_character("O").unwrap();
        stroke(&mut s, (1.0, 1.0), (6.0, 12.0));
        assert_eq!(s.state(), SessionState::Capturing);
        assert_eq!(s.stroke_state().strokes, 1);
        stroke(&mut s, (2.0, 2.0), (3.0, 3.0));
        assert_eq!(s.stroke_state().strokes, 2);
        assert!(surface_is(&s, INK));
        assert!(s.live_ratio().is_some());
    }

    #[test]
    fn full_trace_scores_three_stars_and_blank_one() {
        let mut s = session();
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));

        let eval = s.evaluate().unwrap();
        assert_eq!(eval.difference, 0);
        assert_eq!(eval.ratio, 1.0);
        assert_eq!(eval.stars.get(), 3);
        assert_eq!(eval.strokes, 1);
        assert_eq!(eval.max_strokes, Some(1));
        assert_eq!(s.state(), SessionState::Scored);
        assert_eq!(s.stars(), Some(eval.stars));

        // Guide alone is nowhere near the solid reference
        s.clear();
        let eval = s.evaluate().unwrap();
        assert_eq!(eval.difference, 8 * 16);
        assert_eq!(eval.stars.get(), 1);
    }

    #[test]
    fn evaluate_leaves_surface_untouched() {
        let mut s = session();
        s.set_character("B").unwrap();
        stroke(&mut s, (0.0, 0.0), (0.0, 0.0));
        let before = s.surface_snapshot().unwrap().clone();
        s.evaluate();
        assert_eq!(s.surface_snapshot().unwrap(), &before);
    }

    #[test]
    fn changing_letter_resets_everything() {
        let mut s = session();
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));
        s.evaluate().unwrap();

        s.set_character("B").unwrap();
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.stroke_state().strokes, 0);
        assert!(!s.stroke_state().capturing);
        assert_eq!(s.stars(), None);
        assert!(surface_is(&s, GUIDE_B));
    }

    #[test]
    fn clear_twice_equals_clear_once() {
        let mut s = session();
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));

        s.clear();
        let once = (s.surface_snapshot().unwrap().clone(), *s.stroke_state(), s.state());
        s.clear();
        let twice = (s.surface_snapshot().unwrap().clone(), *s.stroke_state(), s.state());
        assert_eq!(once, twice);
        assert_eq!(once.1.strokes, 0);
        assert!(!once.1.capturing);
        assert_eq!(once.2, SessionState::Ready);
        assert!(surface_is(&s, GUIDE_O));
    }

    #[test]
    fn evaluate_without_character_is_not_applicable() {
        let mut s = session();
        assert_eq!(s.evaluate(), None);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(
            s.calculate_pixel_difference(),
            Err(Error::InvalidCharacter(String::new()))
        );
    }

    #[test]
    fn multi_character_input_is_rejected() {
        let mut s = session();
        s.set_character("O").unwrap();
        assert_eq!(s.set_character("OB"), Err(Error::InvalidCharacter("OB".into())));
        assert_eq!(s.character(), Some('O'));

        s.set_character("").unwrap();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.surface_snapshot().unwrap().is_blank());
    }

    #[test]
    fn unknown_letter_degrades_to_no_guide_and_no_score() {
        let mut s = session();
        s.set_character("Q").unwrap();
        assert_eq!(s.state(), SessionState::Ready);
        assert!(s.surface_snapshot().unwrap().is_blank());
        assert_eq!(s.evaluate(), None);
    }

    #[test]
    fn guide_waits_for_late_sheet() {
        let mut s = session_with(
            AtlasSheet::pending("guide"),
            AtlasSheet::ready("reference", reference_image()),
        );
        s.attach_surface(SurfaceRect::default());
        s.set_character("O").unwrap();
        assert!(s.guide_pending());
        assert!(s.surface_snapshot().unwrap().is_blank());

        // Strokes made before the guide arrives are discarded with the redraw
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));
        assert_eq!(s.stroke_state().strokes, 1);

        s.install_guide(guide_image());
        assert!(!s.guide_pending());
        assert!(surface_is(&s, GUIDE_O));
        assert_eq!(s.stroke_state().strokes, 0);
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn late_guide_after_scoring_starts_the_letter_over() {
        let mut s = session_with(
            AtlasSheet::pending("guide"),
            AtlasSheet::ready("reference", reference_image()),
        );
        s.attach_surface(SurfaceRect::default());
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));
        s.evaluate().unwrap();
        assert_eq!(s.state(), SessionState::Scored);

        // Guide lands mid-press: the redraw drops that press too
        s.pointer_mouse(PointerPhase::Press, 2.0, 2.0);
        s.install_guide(guide_image());

        assert!(surface_is(&s, GUIDE_O));
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.stars(), None);
        assert!(s.evaluation().is_none());
        assert_eq!(s.live_ratio(), None);
        assert_eq!(s.stroke_state().strokes, 0);
        assert!(!s.stroke_state().capturing);

        // A release for the dropped press is not a stroke
        s.pointer_mouse(PointerPhase::Release, 2.0, 2.0);
        assert_eq!(s.stroke_state().strokes, 0);
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn reattaching_after_scoring_starts_the_letter_over() {
        let mut s = session();
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));
        s.evaluate().unwrap();
        assert_eq!(s.state(), SessionState::Scored);

        s.attach_surface(SurfaceRect::default());
        assert!(surface_is(&s, GUIDE_O));
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.stars(), None);
        assert_eq!(s.live_ratio(), None);
        assert_eq!(s.stroke_state().strokes, 0);
        assert!(!s.stroke_state().capturing);
    }

    #[test]
    fn missing_reference_means_score_unavailable() {
        let mut s = session_with(
            AtlasSheet::ready("guide", guide_image()),
            AtlasSheet::pending("reference"),
        );
        s.attach_surface(SurfaceRect::default());
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));
        assert_eq!(s.evaluate(), None);
        assert_eq!(s.state(), SessionState::Capturing);

        s.install_reference(reference_image());
        assert_eq!(s.evaluate().map(|e| e.stars.get()), Some(3));
    }

    #[test]
    fn operations_before_surface_exists_are_safe() {
        let mut s = session_with(
            AtlasSheet::ready("guide", guide_image()),
            AtlasSheet::ready("reference", reference_image()),
        );
        s.set_character("O").unwrap();
        s.pointer_mouse(PointerPhase::Press, 1.0, 1.0);
        s.frame();
        s.clear();
        assert_eq!(s.evaluate(), None);
        assert_eq!(s.calculate_pixel_difference(), Err(Error::SurfaceUnavailable));
        assert!(s.surface_snapshot().is_none());
        assert!(s.guide_pending());

        // The owed guide shows up as soon as a surface is attached
        s.attach_surface(SurfaceRect::default());
        assert!(surface_is(&s, GUIDE_O));
    }

    #[test]
    fn detaching_stops_repaint_and_input() {
        let mut s = session();
        s.set_character("O").unwrap();
        assert!(s.is_repainting());

        s.detach_surface();
        assert!(!s.is_repainting());
        s.pointer_mouse(PointerPhase::Press, 1.0, 1.0);
        assert!(!s.stroke_state().capturing);

        s.attach_surface(SurfaceRect::default());
        assert!(s.is_repainting());
        assert!(surface_is(&s, GUIDE_O));
    }

    #[test]
    fn observer_is_told_about_strokes() {
        let releases = Rc::new(Cell::new(0));
        let counter = Rc::clone(&releases);

        let mut s = session();
        s.set_pointer_observer(Box::new(move |ev| {
            if ev.phase == PointerPhase::Release {
                counter.set(counter.get() + 1);
            }
        }));
        s.set_character("O").unwrap();
        stroke(&mut s, (1.0, 1.0), (2.0, 2.0));
        stroke(&mut s, (1.0, 1.0), (2.0, 2.0));
        assert_eq!(releases.get(), 2);
    }

    #[test]
    fn release_between_frames_inks_the_tail_before_observers_hear_of_it() {
        let mut s = session_with_pen(
            AtlasSheet::ready("guide", guide_image()),
            AtlasSheet::ready("reference", reference_image()),
            2.0,
        );
        s.attach_surface(SurfaceRect::default());
        s.set_character("O").unwrap();

        let releases = Rc::new(Cell::new(0));
        let counter = Rc::clone(&releases);
        s.set_pointer_observer(Box::new(move |ev| {
            if ev.phase == PointerPhase::Release {
                counter.set(counter.get() + 1);
            }
        }));

        s.pointer_mouse(PointerPhase::Press, 1.0, 1.0);
        s.frame();
        s.pointer_mouse(PointerPhase::Move, 6.0, 14.0);
        // No frame before the release
        s.pointer_mouse(PointerPhase::Release, 6.0, 14.0);

        let surface = s.surface_snapshot().unwrap();
        assert_eq!(surface.get(5, 12), Some(INK));
        assert_eq!(surface.get(7, 1), Some(GUIDE_O));
        assert_eq!(s.stroke_state().last, s.stroke_state().current);
        assert_eq!(releases.get(), 1);
        assert_eq!(s.state(), SessionState::Capturing);
    }

    #[test]
    fn drawing_after_scoring_drops_the_stale_score() {
        let mut s = session();
        s.set_character("O").unwrap();
        stroke(&mut s, (4.0, 8.0), (4.0, 8.0));
        s.evaluate().unwrap();
        stroke(&mut s, (1.0, 1.0), (1.0, 1.0));
        assert_eq!(s.state(), SessionState::Capturing);
        assert_eq!(s.stars(), None);
    }

    #[test]
    fn random_pick_stays_in_alphabet() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let c = s.pick_random_character(&mut rng).unwrap();
            assert!(s.alphabet().contains(&c));
            assert_eq!(s.character(), Some(c));
            assert_eq!(s.state(), SessionState::Ready);
            assert_eq!(s.stroke_state().strokes, 0);
        }
    }

    #[test]
    fn overlay_marks_untraced_pixels() {
        let mut s = session();
        s.set_character("O").unwrap();
        let overlay = s.difference_overlay().unwrap();
        assert_eq!(overlay.dimensions(), (8, 16));
        assert!(overlay.pixels.iter().all(|&p| p == 0xFFFF_0000));
    }
}

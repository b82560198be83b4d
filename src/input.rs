// Pointer capture: mouse and touch both end up in `handle_position`, in
// surface-relative device pixels, and drive the StrokeState.

use crate::types::{Position, StrokeState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub source: PointerSource,
    pub phase: PointerPhase,
    pub position: Position,
}

/// Where the surface's top-left corner sits in the coordinate space the
/// input adapters receive (viewport / window coordinates).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
}

impl SurfaceRect {
    pub fn to_surface(&self, client_x: f32, client_y: f32) -> Position {
        Position::new(client_x - self.left, client_y - self.top)
    }
}

pub type Observer = Box<dyn FnMut(&PointerEvent)>;

pub struct PointerCapture {
    state: StrokeState,
    rect: Option<SurfaceRect>, // Some while listening to a live surface
    observer: Option<Observer>,
}

impl PointerCapture {
    pub fn new() -> Self {
        Self { state: StrokeState::default(), rect: None, observer: None }
    }

    /// Start listening for the surface at `rect`. Replaces any previous binding,
    /// so there is only ever one listener set.
    pub fn attach(&mut self, rect: SurfaceRect) {
        if self.rect.is_some() {
            log::debug!("Pointer listeners moved to a new surface");
        }
        self.rect = Some(rect);
        self.state.capturing = false;
    }

    pub fn detach(&mut self) {
        self.rect = None;
        self.state.capturing = false;
    }

    pub fn is_attached(&self) -> bool {
        self.rect.is_some()
    }

    /// Called with every event that changed the stroke state.
    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut StrokeState {
        &mut self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Mouse adapter: client coordinates of a mouse-down / move / up.
    pub fn mouse(&mut self, phase: PointerPhase, client_x: f32, client_y: f32) -> Option<PointerEvent> {
        let rect = self.rect?;
        let position = rect.to_surface(client_x, client_y);
        self.handle_position(position, phase, PointerSource::Mouse)
    }

    /// Touch adapter: `touches` are the active touch points in client coordinates.
    /// Only the first touch draws. Touch-end carries no touches, so it reuses the
    /// current position.
    pub fn touch(&mut self, phase: PointerPhase, touches: &[(f32, f32)]) -> Option<PointerEvent> {
        let rect = self.rect?;
        let position = match (phase, touches.first()) {
            (_, Some(&(x, y))) => rect.to_surface(x, y),
            (PointerPhase::Release, None) => self.state.current,
            (_, None) => return None,
        };
        self.handle_position(position, phase, PointerSource::Touch)
    }

    /// Single entry point for both adapters. Returns the event when it changed
    /// the stroke state; hover moves and stray releases return `None`.
    pub fn handle_position(
        &mut self,
        position: Position,
        phase: PointerPhase,
        source: PointerSource,
    ) -> Option<PointerEvent> {
        if self.rect.is_none() {
            return None;
        }

        match phase {
            PointerPhase::Press => {
                self.state.last = position;
                self.state.current = position;
                self.state.capturing = true;
            }
            PointerPhase::Move => {
                if !self.state.capturing {
                    return None;
                }
                self.state.current = position;
            }
            PointerPhase::Release => {
                if !self.state.capturing {
                    return None;
                }
                self.state.capturing = false;
                self.state.strokes += 1;
            }
        }

        let event = PointerEvent { source, phase, position };
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
        Some(event)
    }
}

impl Default for PointerCapture {
    fn default() -> Self {
        Self::new()
    }
}

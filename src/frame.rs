// Per-frame repaint subscription.
// Subscribing hands back the loop side and a cancel capability. Once cancelled
// (explicitly or by dropping the handle) the loop stops granting frames, so a
// torn-down surface is never painted again.

use std::cell::Cell;
use std::rc::Rc;

pub struct FrameLoop {
    live: Rc<Cell<bool>>,
    frames: u64,
}

pub struct CancelFrames {
    live: Rc<Cell<bool>>,
}

impl FrameLoop {
    pub fn subscribe() -> (FrameLoop, CancelFrames) {
        let live = Rc::new(Cell::new(true));
        (
            FrameLoop { live: Rc::clone(&live), frames: 0 },
            CancelFrames { live },
        )
    }

    /// Ask for the next frame. `false` once the subscription is cancelled.
    pub fn next_frame(&mut self) -> bool {
        if !self.live.get() {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Frames granted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl CancelFrames {
    pub fn cancel(&self) {
        self.live.set(false);
    }
}

impl Drop for CancelFrames {
    fn drop(&mut self) {
        self.cancel();
    }
}

//! Letter tracing practice: capture a learner's strokes over a glyph guide,
//! compare the drawing against a reference glyph pixel by pixel, and turn
//! the difference into a 1..=3 star score.

pub mod assets;
pub mod atlas;
pub mod config;
pub mod diff;
pub mod draw;
pub mod error;
pub mod frame;
pub mod freehand;
pub mod glyph;
pub mod input;
pub mod scoring;
pub mod session;
pub mod types;

pub use error::Error;
pub use session::{PracticeSession, SessionState};

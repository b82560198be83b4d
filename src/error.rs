// One error type for the whole engine, no anyhow/thiserror.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidCharacter(String),  // Empty or multi-character input where one char is required
    CharacterNotFound(char),   // Character is not part of the atlas alphabet
    AssetNotReady(&'static str), // Atlas image still loading
    SurfaceUnavailable,        // No drawing surface attached yet
    AssetLoad(String),         // Opening/decoding an atlas image failed
    Config(String),            // Reading/parsing/validating config.toml failed
    DimensionMismatch { expected: (usize, usize), actual: (usize, usize) },
    WindowInit(String),        // Creating the window failed
    WindowUpdate(String),      // Updating the window buffer failed
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCharacter(s) => {
                write!(f, "Invalid character {s:?}: exactly one character is required")
            }
            Error::CharacterNotFound(c) => write!(f, "Character {c:?} is not in the atlas"),
            Error::AssetNotReady(name) => write!(f, "Asset not ready: {name}"),
            Error::SurfaceUnavailable => write!(f, "Drawing surface unavailable"),
            Error::AssetLoad(s) => write!(f, "Asset load error: {s}"),
            Error::Config(s) => write!(f, "Config error: {s}"),
            Error::DimensionMismatch { expected, actual } => write!(
                f,
                "Dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
        }
    }
}

impl std::error::Error for Error {}

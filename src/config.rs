// src/config.rs
//
// loading config.toml

use crate::error::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The config shipped with the crate, used when no config.toml is found.
const BUILTIN_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub atlas: AtlasConfig,
    pub surface: SurfaceConfig,
    pub pen: PenConfig,
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub strokes: HashMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtlasConfig {
    pub alphabet: String,
    pub cell_width: u32,
    pub cell_height: u32,
    pub guide_image: String,
    pub reference_image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceConfig {
    pub scale: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PenConfig {
    pub width: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub threshold: f64,
    #[serde(default)]
    pub include_anti_aliased: bool,
    pub three_stars: f64,
    pub two_stars: f64,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        // First try next to the executable
        if let Some(exe_config) = Self::load_from_exe_dir() {
            log::info!("Loaded config from executable directory");
            return exe_config;
        }

        // Then the current working directory
        if Path::new("config.toml").exists() {
            log::info!("Loaded config.toml from working directory");
            return Self::load_from_path(Path::new("config.toml"));
        }

        log::info!("No config.toml found, using built-in defaults");
        Self::builtin()
    }

    pub fn builtin() -> Result<Self, Error> {
        Self::parse(BUILTIN_CONFIG)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_exe_dir() -> Option<Result<Self, Error>> {
        let exe_path = std::env::current_exe().ok()?;
        let config_path = exe_path.parent()?.join("config.toml");
        if config_path.exists() {
            Some(Self::load_from_path(&config_path))
        } else {
            None
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.atlas.alphabet.is_empty() {
            return Err(Error::Config("atlas.alphabet must not be empty".into()));
        }
        if self.atlas.cell_width == 0 || self.atlas.cell_height == 0 {
            return Err(Error::Config("atlas cell size must be non-zero".into()));
        }
        if self.surface.scale == 0 {
            return Err(Error::Config("surface.scale must be non-zero".into()));
        }
        let atlas = &self.atlas;
        let cells = atlas.alphabet.chars().count() as u64;
        if u64::from(atlas.cell_width) * cells > u64::from(u32::MAX) {
            return Err(Error::Config("atlas sheet is wider than u32 pixels".into()));
        }
        if atlas.cell_width.checked_mul(self.surface.scale).is_none()
            || atlas.cell_height.checked_mul(self.surface.scale).is_none()
        {
            return Err(Error::Config("surface.scale overflows the surface size".into()));
        }
        if self.pen.width <= 0.0 {
            return Err(Error::Config("pen.width must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.scoring.threshold) {
            return Err(Error::Config("scoring.threshold must be within [0, 1]".into()));
        }
        if self.scoring.two_stars > self.scoring.three_stars {
            return Err(Error::Config(
                "scoring.two_stars must not exceed scoring.three_stars".into(),
            ));
        }
        for (key, budget) in &self.strokes {
            if key.chars().count() != 1 {
                return Err(Error::Config(format!("strokes key {key:?} is not a single character")));
            }
            if *budget == 0 {
                return Err(Error::Config(format!("strokes budget for {key:?} must be positive")));
            }
        }
        Ok(())
    }

    /// Drawing surface size in device pixels. Fits in u32 once validated.
    pub fn surface_size(&self) -> (usize, usize) {
        (
            (self.atlas.cell_width * self.surface.scale) as usize,
            (self.atlas.cell_height * self.surface.scale) as usize,
        )
    }

    /// Keys are validated to be single characters.
    pub fn stroke_budgets(&self) -> HashMap<char, u32> {
        self.strokes
            .iter()
            .filter_map(|(k, v)| k.chars().next().map(|c| (c, *v)))
            .collect()
    }

    pub fn resolve_asset_path(&self, relative: &str) -> PathBuf {
        if Path::new(relative).is_absolute() {
            return PathBuf::from(relative);
        }
        // Prefer a path next to the executable, fall back to the working directory
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.join(relative)))
            .filter(|p| p.exists())
            .unwrap_or_else(|| PathBuf::from(relative))
    }
}

// Background image loading for the atlas sheets.
// `poll()` hands the decoded image over exactly once, so callers can treat
// its return as the "load finished" edge.

use crate::error::Error;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

pub struct ImageLoader {
    path: PathBuf,
    rx: Option<Receiver<Result<RgbaImage, Error>>>,
}

impl ImageLoader {
    /// Start decoding `path` on a worker thread.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel();
        let job_path = path.clone();
        thread::spawn(move || {
            // The receiver may be gone if the session was dropped; nothing to do then.
            let _ = tx.send(decode(&job_path));
        });
        Self { path, rx: Some(rx) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking. `Some` at most once; `None` while loading and after delivery.
    pub fn poll(&mut self) -> Option<Result<RgbaImage, Error>> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.rx = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                Some(Err(Error::AssetLoad(format!(
                    "{}: loader thread exited",
                    self.path.display()
                ))))
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }
}

fn decode(path: &Path) -> Result<RgbaImage, Error> {
    let image = image::open(path)
        .map_err(|e| Error::AssetLoad(format!("{}: {e}", path.display())))?;
    Ok(image.to_rgba8())
}

/// Soundboard file names for a character: `<lower>.jpg` and `<lower>.mp3`.
pub fn soundboard_assets(c: char) -> (String, String) {
    let stem: String = c.to_lowercase().collect();
    (format!("{stem}.jpg"), format!("{stem}.mp3"))
}

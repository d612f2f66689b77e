use crate::config::Viewport;
use std::path::{Path, PathBuf};

/// One capture run: where the deck lives, where slides go, and which slide is
/// current. Only the navigator advances the index.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    url: String,
    out_dir: PathBuf,
    viewport: Viewport,
    index: usize,
}

impl CaptureSession {
    pub fn new(url: impl Into<String>, out_dir: impl Into<PathBuf>, viewport: Viewport) -> Self {
        Self {
            url: url.into(),
            out_dir: out_dir.into(),
            viewport,
            index: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves to the next slide and returns its index.
    pub(crate) fn advance(&mut self) -> usize {
        self.index += 1;
        self.index
    }

    pub fn slide_path(&self, index: usize) -> PathBuf {
        slide_path(&self.out_dir, index)
    }
}

/// `{out}/prezi-{n}.png`
pub fn slide_path(out_dir: &Path, index: usize) -> PathBuf {
    out_dir.join(format!("prezi-{index}.png"))
}

/// A raw capture on its way to disk.
#[derive(Debug)]
pub struct SlideArtifact {
    pub index: usize,
    pub path: PathBuf,
    pub raw: Vec<u8>,
}

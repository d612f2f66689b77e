use std::{path::PathBuf, time::Duration};

/// Failures that end a capture run.
///
/// Absent consent or present buttons are not errors; they are logged and the
/// run continues.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("PREZI NOT FOUND")]
    MissingUrl,

    #[error("invalid presentation url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid configuration")]
    Config(#[source] anyhow::Error),

    #[error("cannot create output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("browser setup failed")]
    Setup(#[source] anyhow::Error),

    #[error("navigation to {url} failed")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("viewer did not load within {0:?}")]
    ViewerNotReady(Duration),

    #[error("failed to write slide {index} to {}", path.display())]
    Postprocess {
        index: usize,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Document(#[from] anyhow::Error),
}

impl CaptureError {
    /// Process exit status for this failure. A viewer that never loads gets
    /// its own status so callers can tell it apart from setup problems and
    /// from clap's usage errors, which exit with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            CaptureError::ViewerNotReady(_) => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_message() {
        assert_eq!(CaptureError::MissingUrl.to_string(), "PREZI NOT FOUND");
        assert_eq!(CaptureError::MissingUrl.exit_code(), 1);
    }

    #[test]
    fn viewer_timeout_has_distinct_status() {
        let e = CaptureError::ViewerNotReady(Duration::from_secs(30));
        assert_eq!(e.exit_code(), 3);
        assert_ne!(e.exit_code(), CaptureError::MissingUrl.exit_code());
    }
}

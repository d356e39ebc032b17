//! Errors raised while loading configuration and running a generation.

use std::path::PathBuf;

use multihop_engine::GenerationError;
use multihop_render::RenderError;
use thiserror::Error;

/// Everything that can go wrong between reading a config file and printing a question.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid TOML or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Names, values or rules in the configuration were rejected.
    #[error(transparent)]
    Foundation(#[from] multihop_foundation::Error),

    /// The strategy gave up.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The chain could not be rendered.
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    /// JSON output could not be produced.
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad command-line usage.
    #[error("{0}")]
    Usage(String),
}

impl RuntimeError {
    /// Creates a usage error.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// The partial chain, if generation failed after building one.
    #[must_use]
    pub fn partial_chain(&self) -> Option<&multihop_engine::Chain> {
        match self {
            Self::Generation(e) => Some(&e.partial),
            _ => None,
        }
    }
}

//! Error types for image output.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to write a rendered image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output file could not be created.
    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PNG encoder or drawing backend failed.
    #[error("failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

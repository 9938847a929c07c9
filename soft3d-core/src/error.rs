//! Error types for the rendering core.

use thiserror::Error;

/// Errors surfaced by the rendering core.
///
/// Loader and scene failures are reported to the caller; the core never
/// terminates the process.
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be read while loading a mesh or texture.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Texture image could not be decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Mesh file structure could not be parsed.
    #[error("mesh parse error: {0}")]
    MeshParse(String),

    /// A node was added as a child while it already had a parent.
    #[error("child node already has an assigned parent")]
    AlreadyParented,

    /// The node given to the renderer does not carry a camera.
    #[error("node does not carry a camera attachment")]
    NotACamera,
}

/// Result type alias using the core's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported to the UI library.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The file is missing, unreadable or not a supported image.
    #[error("failed to load image {}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {} has zero size", path.display())]
    EmptyImage { path: PathBuf },

    #[error("invalid texture data: {len} bytes for {width}x{height} RGBA8")]
    InvalidTextureData { width: u32, height: u32, len: usize },
}

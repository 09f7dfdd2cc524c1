//! Coordinate and geometry types shared by the gfx layer and its clients.
//!
//! Canonical CPU space:
//! - Pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Views convert to clip space through their projection (`Mat4::ortho`).

mod mat4;
mod rect;
mod vec2;
mod viewport;

pub use mat4::Mat4;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;

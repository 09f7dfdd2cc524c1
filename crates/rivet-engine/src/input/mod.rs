//! Pointer input.
//!
//! The public API does not expose winit types; the runtime translates window
//! events into [`InputEvent`]s and folds them into an [`InputState`] (what is
//! held now) and an [`InputFrame`] (what changed this frame).
//!
//! Positions are in physical pixels, the space views and scissor rects use.

mod frame;
mod state;
mod types;
pub(crate) mod winit_events;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Modifiers, MouseButton, PointerButtonEvent};

use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::ModifiersState;

use crate::coords::Vec2;

use super::{ButtonState, InputEvent, InputState, Modifiers, MouseButton, PointerButtonEvent};

/// Translates a winit window event into an [`InputEvent`].
///
/// Returns `None` for events the input layer does not track.
pub(crate) fn translate_window_event(state: &InputState, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::ModifiersChanged(m) => Some(InputEvent::ModifiersChanged(map_modifiers(m.state()))),

        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => {
            Some(InputEvent::PointerMoved(Vec2::new(position.x as f32, position.y as f32)))
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            let button_state = match st {
                ElementState::Pressed => ButtonState::Pressed,
                ElementState::Released => ButtonState::Released,
            };
            // winit 0.30 has no cursor query; use the tracked position.
            let position = state.pointer_pos.unwrap_or(Vec2::ZERO);
            Some(InputEvent::PointerButton(PointerButtonEvent {
                button: map_mouse_button(*button),
                state: button_state,
                position,
            }))
        }

        _ => None,
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

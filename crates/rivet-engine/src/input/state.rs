use std::collections::HashSet;

use crate::coords::Vec2;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Modifiers, MouseButton, PointerButtonEvent};

/// Current pointer state of the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// `None` while the pointer is outside the window.
    pub pointer_pos: Option<Vec2>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the current state and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = m,

            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Releases are not delivered to unfocused windows.
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(p) => self.pointer_pos = Some(p),
            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::PointerButton(PointerButtonEvent { button, state, position }) => {
                self.pointer_pos = Some(position);
                match state {
                    ButtonState::Pressed => {
                        if self.buttons_down.insert(button) {
                            frame.buttons_pressed.insert(button);
                        }
                    }
                    ButtonState::Released => {
                        if self.buttons_down.remove(&button) {
                            frame.buttons_released.insert(button);
                        }
                    }
                }
            }
        }

        frame.events.push(ev);
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

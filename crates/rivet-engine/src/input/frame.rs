use std::collections::HashSet;

use super::types::{InputEvent, MouseButton};

/// Input that arrived during the current frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
    }

    pub fn pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }
}

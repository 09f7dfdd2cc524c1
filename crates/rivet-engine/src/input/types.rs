use crate::coords::Vec2;

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl MouseButton {
    /// Conventional UI button index: 0 left, 1 right, 2 middle.
    pub fn index(self) -> Option<u8> {
        match self {
            MouseButton::Left => Some(0),
            MouseButton::Right => Some(1),
            MouseButton::Middle => Some(2),
            MouseButton::Other(_) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Modifier keys held while an event happened.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Packs into `shift | ctrl << 1 | alt << 2 | meta << 3`.
    pub fn bits(self) -> u8 {
        self.shift as u8 | (self.ctrl as u8) << 1 | (self.alt as u8) << 2 | (self.meta as u8) << 3
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: ButtonState,
    /// Pointer position when the button changed.
    pub position: Vec2,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),
    PointerMoved(Vec2),
    PointerButton(PointerButtonEvent),
    /// Pointer left the window surface.
    PointerLeft,
    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_indices_follow_ui_convention() {
        assert_eq!(MouseButton::Left.index(), Some(0));
        assert_eq!(MouseButton::Right.index(), Some(1));
        assert_eq!(MouseButton::Middle.index(), Some(2));
        assert_eq!(MouseButton::Other(7).index(), None);
    }

    #[test]
    fn modifier_bits() {
        let m = Modifiers { shift: true, alt: true, ..Default::default() };
        assert_eq!(m.bits(), 0b0101);
        assert_eq!(Modifiers::default().bits(), 0);
    }
}

use rivet_engine::coords::Vec2;
use rivet_engine::input::{InputState, MouseButton};

/// Receiver of forwarded mouse input. Buttons are numbered 0 (left) and
/// 1 (right); `modifiers` is [`rivet_engine::input::Modifiers::bits`].
pub trait UiInputSink {
    fn mouse_move(&mut self, position: Vec2, modifiers: u8);
    fn mouse_button_down(&mut self, button: u8, modifiers: u8);
    fn mouse_button_up(&mut self, button: u8, modifiers: u8);
}

const FORWARDED: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Polls [`InputState`] once per frame and forwards the pointer position plus
/// left/right button transitions.
#[derive(Debug, Default)]
pub struct MouseForwarder {
    was_down: [bool; 2],
}

impl MouseForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward<S: UiInputSink + ?Sized>(&mut self, input: &InputState, sink: &mut S) {
        let modifiers = input.modifiers.bits();

        if let Some(pos) = input.pointer_pos {
            sink.mouse_move(pos, modifiers);
        }

        for (slot, button) in FORWARDED.iter().enumerate() {
            let Some(index) = button.index() else { continue };
            let down = input.button_down(*button);
            match (self.was_down[slot], down) {
                (false, true) => sink.mouse_button_down(index, modifiers),
                (true, false) => sink.mouse_button_up(index, modifiers),
                _ => {}
            }
            self.was_down[slot] = down;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_engine::input::{ButtonState, InputEvent, InputFrame, PointerButtonEvent};

    #[derive(Debug, PartialEq)]
    enum Call {
        Move(Vec2),
        Down(u8),
        Up(u8),
    }

    #[derive(Default)]
    struct Sink(Vec<Call>);

    impl UiInputSink for Sink {
        fn mouse_move(&mut self, position: Vec2, _modifiers: u8) {
            self.0.push(Call::Move(position));
        }
        fn mouse_button_down(&mut self, button: u8, _modifiers: u8) {
            self.0.push(Call::Down(button));
        }
        fn mouse_button_up(&mut self, button: u8, _modifiers: u8) {
            self.0.push(Call::Up(button));
        }
    }

    fn button(state: &mut InputState, button: MouseButton, s: ButtonState) {
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state: s,
                position: Vec2::new(4.0, 2.0),
            }),
        );
    }

    #[test]
    fn buttons_forward_on_edges_only() {
        let mut input = InputState::default();
        let mut fwd = MouseForwarder::new();
        let mut sink = Sink::default();

        button(&mut input, MouseButton::Left, ButtonState::Pressed);
        fwd.forward(&input, &mut sink);
        fwd.forward(&input, &mut sink);
        button(&mut input, MouseButton::Left, ButtonState::Released);
        fwd.forward(&input, &mut sink);

        let buttons: Vec<_> = sink.0.iter().filter(|c| !matches!(c, Call::Move(_))).collect();
        assert_eq!(buttons, vec![&Call::Down(0), &Call::Up(0)]);
    }

    #[test]
    fn right_button_is_one_and_middle_is_ignored() {
        let mut input = InputState::default();
        let mut fwd = MouseForwarder::new();
        let mut sink = Sink::default();

        button(&mut input, MouseButton::Middle, ButtonState::Pressed);
        button(&mut input, MouseButton::Right, ButtonState::Pressed);
        fwd.forward(&input, &mut sink);

        assert_eq!(sink.0, vec![Call::Move(Vec2::new(4.0, 2.0)), Call::Down(1)]);
    }

    #[test]
    fn position_is_forwarded_every_frame_while_inside() {
        let mut input = InputState::default();
        let mut fwd = MouseForwarder::new();
        let mut sink = Sink::default();

        fwd.forward(&input, &mut sink);
        assert!(sink.0.is_empty());

        input.pointer_pos = Some(Vec2::new(10.0, 20.0));
        fwd.forward(&input, &mut sink);
        fwd.forward(&input, &mut sink);
        assert_eq!(sink.0.len(), 2);
    }
}

//! Turns raw key and modifier events into session actions.
//!
//! One raw event produces at most one action. The only state kept here is
//! whether the triggering modifier is held; whether a session is open is
//! owned by the engine and passed in.

use crate::engine::SessionAction;
use crate::session::Direction;
use bitflags::bitflags;

/// Physical key code, as reported by the kernel input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ESC: KeyCode = KeyCode(1);
    pub const TAB: KeyCode = KeyCode(15);
    pub const LEFT_CTRL: KeyCode = KeyCode(29);
    pub const LEFT_SHIFT: KeyCode = KeyCode(42);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(54);
    pub const LEFT_ALT: KeyCode = KeyCode(56);
    pub const RIGHT_CTRL: KeyCode = KeyCode(97);
    pub const RIGHT_ALT: KeyCode = KeyCode(100);
    pub const LEFT_META: KeyCode = KeyCode(125);
    pub const RIGHT_META: KeyCode = KeyCode(126);
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

impl Modifiers {
    /// The modifier a physical key contributes, if it is a modifier key.
    pub fn for_key(key: KeyCode) -> Option<Modifiers> {
        match key {
            KeyCode::LEFT_SHIFT | KeyCode::RIGHT_SHIFT => Some(Modifiers::SHIFT),
            KeyCode::LEFT_CTRL | KeyCode::RIGHT_CTRL => Some(Modifiers::CTRL),
            KeyCode::LEFT_ALT | KeyCode::RIGHT_ALT => Some(Modifiers::ALT),
            KeyCode::LEFT_META | KeyCode::RIGHT_META => Some(Modifiers::SUPER),
            _ => None,
        }
    }
}

/// A raw input event, carrying the modifier state at the time it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    KeyDown { key: KeyCode, modifiers: Modifiers },
    KeyUp { key: KeyCode, modifiers: Modifiers },
    ModifiersChanged(Modifiers),
}

/// Which keys drive the switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotKeyBinding {
    pub cycle_key: KeyCode,
    pub cancel_key: KeyCode,
    /// Held for the whole gesture; releasing it commits
    pub trigger: Modifiers,
    /// Held together with the trigger to cycle backwards
    pub reverse: Modifiers,
}

impl HotKeyBinding {
    /// Tab cycles, Escape cancels, Shift reverses.
    pub fn new(trigger: Modifiers) -> Self {
        HotKeyBinding {
            cycle_key: KeyCode::TAB,
            cancel_key: KeyCode::ESC,
            trigger,
            reverse: Modifiers::SHIFT,
        }
    }

    fn is_trigger_key(&self, key: KeyCode) -> bool {
        Modifiers::for_key(key).is_some_and(|m| self.trigger.contains(m))
    }
}

impl Default for HotKeyBinding {
    fn default() -> Self {
        HotKeyBinding::new(Modifiers::ALT)
    }
}

#[derive(Debug)]
pub struct GestureInterpreter {
    binding: HotKeyBinding,
    trigger_held: bool,
}

impl GestureInterpreter {
    pub fn new(binding: HotKeyBinding) -> Self {
        GestureInterpreter {
            binding,
            trigger_held: false,
        }
    }

    #[allow(dead_code)]
    pub fn trigger_held(&self) -> bool {
        self.trigger_held
    }

    /// Interpret one raw event. `session_open` is the engine's current phase.
    pub fn interpret(&mut self, event: RawInputEvent, session_open: bool) -> Option<SessionAction> {
        let binding = self.binding;

        match event {
            RawInputEvent::KeyDown { key, modifiers } if key == binding.cycle_key => {
                self.trigger_held = modifiers.contains(binding.trigger);
                if !self.trigger_held {
                    return None;
                }

                let direction = if modifiers.contains(binding.reverse) {
                    Direction::Retreat
                } else {
                    Direction::Advance
                };
                Some(SessionAction::GestureStart { direction })
            }
            RawInputEvent::KeyDown { key, .. } if key == binding.cancel_key => {
                session_open.then_some(SessionAction::Cancel)
            }
            RawInputEvent::KeyDown { modifiers, .. } => {
                self.trigger_held = modifiers.contains(binding.trigger);
                None
            }
            RawInputEvent::ModifiersChanged(modifiers) => {
                let was_held = self.trigger_held;
                self.trigger_held = modifiers.contains(binding.trigger);
                (was_held && !self.trigger_held && session_open).then_some(SessionAction::Commit)
            }
            RawInputEvent::KeyUp { key, .. } if binding.is_trigger_key(key) => {
                // Both this and the matching ModifiersChanged may arrive for one
                // release; whichever comes second finds the session closed.
                self.trigger_held = false;
                session_open.then_some(SessionAction::Commit)
            }
            RawInputEvent::KeyUp { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: KeyCode, modifiers: Modifiers) -> RawInputEvent {
        RawInputEvent::KeyDown { key, modifiers }
    }

    fn key_up(key: KeyCode, modifiers: Modifiers) -> RawInputEvent {
        RawInputEvent::KeyUp { key, modifiers }
    }

    const FORWARD: Option<SessionAction> = Some(SessionAction::GestureStart {
        direction: Direction::Advance,
    });
    const BACKWARD: Option<SessionAction> = Some(SessionAction::GestureStart {
        direction: Direction::Retreat,
    });

    #[test]
    fn test_tab_with_alt_starts_gesture() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), false), FORWARD);
        assert!(gi.trigger_held());
    }

    #[test]
    fn test_tab_with_alt_shift_starts_reverse_gesture() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        let mods = Modifiers::ALT | Modifiers::SHIFT;
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, mods), false), BACKWARD);
    }

    #[test]
    fn test_tab_while_open_still_emits_gesture_start() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), true), FORWARD);
    }

    #[test]
    fn test_tab_without_trigger_is_ignored() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::empty()), false), None);
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::SHIFT), true), None);
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::CTRL), false), None);
    }

    #[test]
    fn test_super_binding() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::new(Modifiers::SUPER));
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), false), None);
        assert_eq!(gi.interpret(key_down(KeyCode::TAB, Modifiers::SUPER), false), FORWARD);
        assert_eq!(
            gi.interpret(key_up(KeyCode::LEFT_META, Modifiers::empty()), true),
            Some(SessionAction::Commit)
        );
    }

    #[test]
    fn test_escape_cancels_only_when_open() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        assert_eq!(gi.interpret(key_down(KeyCode::ESC, Modifiers::empty()), false), None);
        assert_eq!(
            gi.interpret(key_down(KeyCode::ESC, Modifiers::empty()), true),
            Some(SessionAction::Cancel)
        );
        assert_eq!(
            gi.interpret(key_down(KeyCode::ESC, Modifiers::ALT), true),
            Some(SessionAction::Cancel)
        );
    }

    #[test]
    fn test_modifier_release_commits() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::ALT), false);
        gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), false);

        assert_eq!(
            gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::empty()), true),
            Some(SessionAction::Commit)
        );
        assert!(!gi.trigger_held());
    }

    #[test]
    fn test_modifier_release_while_closed_is_ignored() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::ALT), false);
        assert_eq!(
            gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::empty()), false),
            None
        );
    }

    #[test]
    fn test_unrelated_modifier_change_does_not_commit() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::ALT | Modifiers::SHIFT), false);
        assert_eq!(
            gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::ALT), true),
            None
        );
        assert!(gi.trigger_held());
    }

    #[test]
    fn test_trigger_key_up_commits() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), false);
        assert_eq!(
            gi.interpret(key_up(KeyCode::RIGHT_ALT, Modifiers::empty()), true),
            Some(SessionAction::Commit)
        );
    }

    #[test]
    fn test_release_reported_twice_commits_once() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        let mut open = false;

        if let Some(SessionAction::GestureStart { .. }) =
            gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), open)
        {
            open = true;
        }

        let mut commits = 0;
        for event in [
            key_up(KeyCode::LEFT_ALT, Modifiers::empty()),
            RawInputEvent::ModifiersChanged(Modifiers::empty()),
        ] {
            if gi.interpret(event, open) == Some(SessionAction::Commit) {
                commits += 1;
                open = false;
            }
        }
        assert_eq!(commits, 1);
    }

    #[test]
    fn test_flag_change_before_key_up_commits_once() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        gi.interpret(key_down(KeyCode::TAB, Modifiers::ALT), false);

        assert_eq!(
            gi.interpret(RawInputEvent::ModifiersChanged(Modifiers::empty()), true),
            Some(SessionAction::Commit)
        );
        assert_eq!(gi.interpret(key_up(KeyCode::LEFT_ALT, Modifiers::empty()), false), None);
    }

    #[test]
    fn test_other_events_are_ignored() {
        let mut gi = GestureInterpreter::new(HotKeyBinding::default());
        assert_eq!(gi.interpret(key_down(KeyCode(30), Modifiers::ALT), true), None);
        assert_eq!(gi.interpret(key_up(KeyCode::TAB, Modifiers::ALT), true), None);
        assert_eq!(gi.interpret(key_up(KeyCode::LEFT_SHIFT, Modifiers::ALT), true), None);
    }

    #[test]
    fn test_modifier_for_key() {
        assert_eq!(Modifiers::for_key(KeyCode::LEFT_ALT), Some(Modifiers::ALT));
        assert_eq!(Modifiers::for_key(KeyCode::RIGHT_SHIFT), Some(Modifiers::SHIFT));
        assert_eq!(Modifiers::for_key(KeyCode::RIGHT_META), Some(Modifiers::SUPER));
        assert_eq!(Modifiers::for_key(KeyCode::TAB), None);
    }
}

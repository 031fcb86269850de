use std::collections::{HashMap, HashSet};

/// Marks a key release in `Input::down`.
///
/// The total duration of a key press is the difference between the released value and `KEY_RELEASED`.
/// A user would have to hold a key for about 230 days (at 50 ticks per second) before
/// the held duration saturates.
pub const KEY_RELEASED: i32 = -1_000_000_000;

/// Held durations stop growing here, so that a released value is always negative.
pub const MAX_HELD_TICKS: i32 = -KEY_RELEASED - 1;

/// Symbolic name for a key on the keyboard, or a mouse button.
///
/// Mouse buttons live in the same space as keys so that `Input::down` tracks both the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    MouseLeft,
    MouseMiddle,
    MouseRight,

    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,

    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadAdd,
    KeypadSubtract,
    KeypadMultiply,
    KeypadDivide,
    KeypadDecimal,
    KeypadEnter,
    KeypadEquals,

    /// For any country/region, the '=+' key.
    Equals,
    /// For any country/region, the ',<' key.
    Comma,
    /// For any country/region, the '-_' key.
    Minus,
    /// For any country/region, the '.>' key.
    Period,
    /// For the US standard keyboard, the ';:' key.
    Semicolon,
    /// For the US standard keyboard, the '/?' key.
    Slash,
    /// For the US standard keyboard, the '`~' key.
    Grave,
    /// For the US standard keyboard, the '[{' key.
    LBracket,
    /// For the US standard keyboard, the '\\|' key.
    Backslash,
    /// For the US standard keyboard, the ']}' key.
    RBracket,
    /// For the US standard keyboard, the 'single-quote/double-quote' key.
    Apostrophe,

    Tab,
    Space,
    Insert,
    Delete,
    Backspace,
    Enter,
    Escape,
    Pause,
    CapsLock,
    NumLock,
    ScrollLock,
    Snapshot,

    PageUp,
    PageDown,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,

    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    LSuper,
    RSuper,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
}

impl Key {
    /// true for the mouse buttons.
    pub fn is_mouse_button(self) -> bool {
        matches!(self, Key::MouseLeft | Key::MouseMiddle | Key::MouseRight)
    }
}

/// User input since the previous poll. Mostly the keys that are currently pressed and how long they have been
/// pressed (measured in poll ticks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// Current mouse location in window pixels. origin is bottom left.
    pub mx: i32,
    pub my: i32,
    /// Wheel lines scrolled since the last poll, positive when the wheel rolls toward the user.
    pub scroll: i32,
    /// True if the window has focus.
    pub focus: bool,
    /// True if the window was resized or moved since the last poll.
    pub resized: bool,
    /// Pressed keys and their pressed duration in ticks.
    ///
    /// A positive duration means the key is still being held down.
    /// A negative duration means that the key has been released since the last poll.
    /// The total pressed duration prior to release is the difference with `KEY_RELEASED`.
    /// Released keys are gone from the map on the following poll.
    pub down: HashMap<Key, i32>,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            mx: 0,
            my: 0,
            scroll: 0,
            focus: true,
            resized: false,
            down: HashMap::new(),
        }
    }
}

impl Input {
    /// true only in the poll where the key went down.
    pub fn pressed(&self, key: Key) -> bool {
        self.down.get(&key) == Some(&1)
    }

    /// true while the key is held, including the poll it went down.
    pub fn held(&self, key: Key) -> bool {
        self.down.get(&key).is_some_and(|d| *d > 0)
    }

    /// if the key was released since the last poll, returns how many ticks it was held.
    pub fn released(&self, key: Key) -> Option<i32> {
        self.down
            .get(&key)
            .filter(|d| **d < 0)
            .map(|d| held_ticks(*d))
    }
}

/// Recovers the held duration from a `Input::down` value, released or not.
pub fn held_ticks(duration: i32) -> i32 {
    if duration < 0 {
        duration - KEY_RELEASED
    } else {
        duration
    }
}

/// Backend agnostic input events. Window backends convert their native events into these
/// and feed them to an `InputRecorder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    KeyPressed(Key),
    KeyReleased(Key),
    /// wheel lines, positive toward the user.
    Scroll(i32),
    /// window pixels, bottom left origin.
    CursorMoved { x: i32, y: i32 },
    Focus(bool),
    /// resized or moved.
    Resized,
}

/// Turns a stream of `DeviceEvent`s into per-poll `Input` snapshots.
///
/// Every poll a backend calls `begin_poll`, records all the events it pumped from the os,
/// and then hands out `snapshot`.
#[derive(Debug, Clone, Default)]
pub struct InputRecorder {
    input: Input,
    /// keys pressed again after being released this tick. they go down on the next poll,
    /// so the release stays visible for one snapshot.
    repressed: HashSet<Key>,
}

impl InputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new tick: forget last tick's releases and one-shot flags, age the held keys.
    pub fn begin_poll(&mut self) {
        self.input.scroll = 0;
        self.input.resized = false;
        self.input.down.retain(|_, duration| *duration > 0);
        for duration in self.input.down.values_mut() {
            *duration = duration.saturating_add(1).min(MAX_HELD_TICKS);
        }
        for key in self.repressed.drain() {
            self.input.down.insert(key, 1);
        }
    }

    pub fn record(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::KeyPressed(key) => match self.input.down.get(&key) {
                None => {
                    self.input.down.insert(key, 1);
                }
                // released this tick. goes down again on the next poll.
                Some(duration) if *duration < 0 => {
                    self.repressed.insert(key);
                }
                // repeats of a held key keep their duration.
                Some(_) => {}
            },
            DeviceEvent::KeyReleased(key) => {
                if !self.repressed.remove(&key) {
                    self.release(key);
                }
            }
            DeviceEvent::Scroll(lines) => {
                self.input.scroll = self.input.scroll.saturating_add(lines);
            }
            DeviceEvent::CursorMoved { x, y } => {
                self.input.mx = x;
                self.input.my = y;
            }
            DeviceEvent::Focus(focus) => {
                if self.input.focus != focus {
                    tracing::debug!(focus, "focus changed");
                }
                self.input.focus = focus;
                if !focus {
                    // the os stops sending key ups to an unfocused window.
                    self.repressed.clear();
                    let held: Vec<Key> = self
                        .input
                        .down
                        .iter()
                        .filter(|(_, d)| **d > 0)
                        .map(|(k, _)| *k)
                        .collect();
                    for key in held {
                        self.release(key);
                    }
                }
            }
            DeviceEvent::Resized => self.input.resized = true,
        }
    }

    fn release(&mut self, key: Key) {
        if let Some(duration) = self.input.down.get_mut(&key) {
            if *duration > 0 {
                *duration += KEY_RELEASED;
            }
        }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// owned copy of the current state, handed to the app from `Device::poll_input`.
    pub fn snapshot(&self) -> Input {
        self.input.clone()
    }
}

/// Turns fractional wheel deltas (touchpads, pixel scrolling) into whole lines
/// without dropping the remainders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollAccumulator {
    carry: f64,
}

impl ScrollAccumulator {
    /// `delta` in lines, positive toward the user. returns the whole lines to report now.
    pub fn lines(&mut self, delta: f64) -> i32 {
        self.carry += delta;
        let whole = self.carry.trunc();
        self.carry -= whole;
        whole as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_accumulator_keeps_fractions() {
        let mut scroll = ScrollAccumulator::default();
        assert_eq!(scroll.lines(0.4), 0);
        assert_eq!(scroll.lines(0.4), 0);
        assert_eq!(scroll.lines(0.4), 1);
        assert_eq!(scroll.lines(-3.0), -2);
        assert_eq!(scroll.lines(2.0), 1);
    }

    fn recorder_with(events: &[DeviceEvent]) -> InputRecorder {
        let mut recorder = InputRecorder::new();
        recorder.begin_poll();
        for event in events {
            recorder.record(*event);
        }
        recorder
    }

    #[test]
    fn press_starts_at_one_and_ages_every_poll() {
        let mut recorder = recorder_with(&[DeviceEvent::KeyPressed(Key::W)]);
        assert!(recorder.input().pressed(Key::W));
        recorder.begin_poll();
        assert_eq!(recorder.input().down[&Key::W], 2);
        assert!(!recorder.input().pressed(Key::W));
        assert!(recorder.input().held(Key::W));
    }

    #[test]
    fn release_keeps_the_held_duration() {
        let mut recorder = recorder_with(&[DeviceEvent::KeyPressed(Key::A)]);
        recorder.begin_poll();
        recorder.begin_poll();
        recorder.record(DeviceEvent::KeyReleased(Key::A));
        assert_eq!(recorder.input().down[&Key::A], KEY_RELEASED + 3);
        assert_eq!(recorder.input().released(Key::A), Some(3));
        recorder.begin_poll();
        assert!(!recorder.input().down.contains_key(&Key::A));
    }

    #[test]
    fn press_and_release_in_one_poll() {
        let recorder = recorder_with(&[
            DeviceEvent::KeyPressed(Key::MouseLeft),
            DeviceEvent::KeyReleased(Key::MouseLeft),
        ]);
        assert_eq!(recorder.input().down[&Key::MouseLeft], KEY_RELEASED + 1);
    }

    #[test]
    fn repeats_do_not_restart_a_held_key() {
        let mut recorder = recorder_with(&[DeviceEvent::KeyPressed(Key::Space)]);
        recorder.begin_poll();
        recorder.record(DeviceEvent::KeyPressed(Key::Space));
        assert_eq!(recorder.input().down[&Key::Space], 2);
    }

    #[test]
    fn release_then_press_in_one_poll_shows_the_release_first() {
        let mut recorder = recorder_with(&[DeviceEvent::KeyPressed(Key::W)]);
        recorder.begin_poll();
        recorder.record(DeviceEvent::KeyReleased(Key::W));
        recorder.record(DeviceEvent::KeyPressed(Key::W));
        assert_eq!(recorder.input().released(Key::W), Some(2));
        recorder.begin_poll();
        assert!(recorder.input().pressed(Key::W));
        recorder.begin_poll();
        assert_eq!(recorder.input().down[&Key::W], 2);
    }

    #[test]
    fn tap_after_release_in_one_poll_is_dropped() {
        let mut recorder = recorder_with(&[
            DeviceEvent::KeyPressed(Key::E),
            DeviceEvent::KeyReleased(Key::E),
            DeviceEvent::KeyPressed(Key::E),
            DeviceEvent::KeyReleased(Key::E),
        ]);
        assert_eq!(recorder.input().released(Key::E), Some(1));
        recorder.begin_poll();
        assert!(!recorder.input().down.contains_key(&Key::E));
    }

    #[test]
    fn losing_focus_cancels_a_queued_press() {
        let mut recorder = recorder_with(&[
            DeviceEvent::KeyPressed(Key::D),
            DeviceEvent::KeyReleased(Key::D),
            DeviceEvent::KeyPressed(Key::D),
            DeviceEvent::Focus(false),
        ]);
        assert_eq!(recorder.input().released(Key::D), Some(1));
        recorder.begin_poll();
        assert!(recorder.input().down.is_empty());
    }

    #[test]
    fn release_of_unknown_key_is_ignored() {
        let recorder = recorder_with(&[DeviceEvent::KeyReleased(Key::Q)]);
        assert!(recorder.input().down.is_empty());
    }

    #[test]
    fn losing_focus_releases_held_keys() {
        let mut recorder = recorder_with(&[
            DeviceEvent::KeyPressed(Key::LShift),
            DeviceEvent::KeyPressed(Key::MouseRight),
        ]);
        recorder.begin_poll();
        recorder.record(DeviceEvent::Focus(false));
        let input = recorder.input();
        assert!(!input.focus);
        assert_eq!(input.released(Key::LShift), Some(2));
        assert_eq!(input.released(Key::MouseRight), Some(2));
    }

    #[test]
    fn scroll_and_resize_last_one_poll() {
        let mut recorder = recorder_with(&[
            DeviceEvent::Scroll(2),
            DeviceEvent::Scroll(-5),
            DeviceEvent::Resized,
            DeviceEvent::CursorMoved { x: 10, y: 20 },
        ]);
        assert_eq!(recorder.input().scroll, -3);
        assert!(recorder.input().resized);
        recorder.begin_poll();
        let input = recorder.snapshot();
        assert_eq!(input.scroll, 0);
        assert!(!input.resized);
        // the mouse stays where it was.
        assert_eq!((input.mx, input.my), (10, 20));
    }

    #[test]
    fn held_duration_saturates_below_the_sentinel() {
        let mut recorder = InputRecorder::new();
        recorder.input.down.insert(Key::Z, MAX_HELD_TICKS);
        recorder.begin_poll();
        assert_eq!(recorder.input().down[&Key::Z], MAX_HELD_TICKS);
        recorder.record(DeviceEvent::KeyReleased(Key::Z));
        assert_eq!(recorder.input().down[&Key::Z], -1);
        assert_eq!(recorder.input().released(Key::Z), Some(MAX_HELD_TICKS));
    }

    #[test]
    fn held_ticks_reads_both_encodings() {
        assert_eq!(held_ticks(7), 7);
        assert_eq!(held_ticks(KEY_RELEASED + 7), 7);
    }
}

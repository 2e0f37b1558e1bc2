#![forbid(unsafe_code)]

//! Canonical input and key-event types.
//!
//! The overlay core never talks to hardware. Raw button and key levels come
//! in through [`InputSource`], and synthesized key events go out through
//! [`KeyEventSink`]. Both are implemented by the frame-loop host; tests use
//! a recording sink.
//!
//! # Design Notes
//!
//! - `OutputKey` is an opaque host key code; the core only compares it
//!   against [`OutputKey::NONE`] and passes it through.
//! - Joypad buttons use the conventional pad numbering (B = 0 .. R3 = 15)
//!   so caller-supplied button→key maps index directly by button.
//! - Polling must be side-effect-free and consistent within a frame.

/// A host key code emitted through [`KeyEventSink`].
///
/// The value space belongs to the host (typically its keyboard key codes);
/// the core treats it as opaque apart from the reserved [`OutputKey::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct OutputKey(pub u16);

impl OutputKey {
    /// Reserved "emit nothing" value for unmapped buttons.
    pub const NONE: OutputKey = OutputKey(0);

    /// True for any value other than [`OutputKey::NONE`].
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

/// A raw keyboard input identifier (host scan code / keysym).
///
/// The core tracks edge state for codes `0..512`; codes outside that range
/// are never generated by supported hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct ScanCode(pub u16);

impl ScanCode {
    /// Highest tracked scan code (inclusive).
    pub const MAX: u16 = 511;

    /// Tab, the conventional keyboard visibility toggle.
    pub const TAB: ScanCode = ScanCode(9);
    /// Return, the keyboard navigation activate key.
    pub const RETURN: ScanCode = ScanCode(13);
    /// Up arrow.
    pub const UP: ScanCode = ScanCode(273);
    /// Down arrow.
    pub const DOWN: ScanCode = ScanCode(274);
    /// Right arrow.
    pub const RIGHT: ScanCode = ScanCode(275);
    /// Left arrow.
    pub const LEFT: ScanCode = ScanCode(276);
}

/// What kind of device (if any) is plugged into an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// Nothing connected; the port is skipped entirely.
    #[default]
    None,
    /// A 16-button game pad.
    Joypad,
    /// A native keyboard.
    Keyboard,
}

/// The sixteen canonical pad buttons, numbered `0..16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JoypadButton {
    /// Face button B (index 0).
    B = 0,
    /// Face button Y.
    Y = 1,
    /// Select. Reserved for the overlay visibility toggle.
    Select = 2,
    /// Start.
    Start = 3,
    /// D-pad up.
    Up = 4,
    /// D-pad down.
    Down = 5,
    /// D-pad left.
    Left = 6,
    /// D-pad right.
    Right = 7,
    /// Face button A (index 8).
    A = 8,
    /// Face button X.
    X = 9,
    /// Left shoulder.
    L = 10,
    /// Right shoulder.
    R = 11,
    /// Left trigger.
    L2 = 12,
    /// Right trigger.
    R2 = 13,
    /// Left stick click.
    L3 = 14,
    /// Right stick click.
    R3 = 15,
}

impl JoypadButton {
    /// All sixteen buttons in index order.
    pub const ALL: [JoypadButton; 16] = [
        JoypadButton::B,
        JoypadButton::Y,
        JoypadButton::Select,
        JoypadButton::Start,
        JoypadButton::Up,
        JoypadButton::Down,
        JoypadButton::Left,
        JoypadButton::Right,
        JoypadButton::A,
        JoypadButton::X,
        JoypadButton::L,
        JoypadButton::R,
        JoypadButton::L2,
        JoypadButton::R2,
        JoypadButton::L3,
        JoypadButton::R3,
    ];

    /// The button's bit/index position.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One raw input on a port: a pad button level or a keyboard key level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawInput {
    /// A joypad button.
    Pad(JoypadButton),
    /// A keyboard scan code.
    Key(ScanCode),
}

/// Side-effect-free poll of current input levels.
///
/// Implemented by the host over its input backend. `is_down` is called once
/// per tracked input per frame and must return consistent answers within a
/// frame (the core may poll the same input from more than one code path).
pub trait InputSource {
    /// Is this input currently held down on this port?
    fn is_down(&self, port: usize, input: RawInput) -> bool;
}

impl<F> InputSource for F
where
    F: Fn(usize, RawInput) -> bool,
{
    fn is_down(&self, port: usize, input: RawInput) -> bool {
        self(port, input)
    }
}

/// Receives the virtual key events the overlay synthesizes.
///
/// The core guarantees edge discipline: for momentary keys every `press` is
/// eventually paired with a `release`, and a held physical input never
/// repeats its event. Latched toggle keys are re-asserted with additional
/// `press` calls on each momentary commit (see the session documentation).
pub trait KeyEventSink {
    /// A virtual key went down.
    fn press(&mut self, key: OutputKey);
    /// A virtual key came back up.
    fn release(&mut self, key: OutputKey);
}

/// One event recorded by [`RecordingSink`].
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// `press` was called with this key.
    Press(OutputKey),
    /// `release` was called with this key.
    Release(OutputKey),
}

/// A [`KeyEventSink`] that records every event in order, for tests.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Recorded events, oldest first.
    pub events: Vec<SinkEvent>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingSink {
    /// Drain the recorded events, leaving the sink empty.
    pub fn take(&mut self) -> Vec<SinkEvent> {
        core::mem::take(&mut self.events)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl KeyEventSink for RecordingSink {
    fn press(&mut self, key: OutputKey) {
        self.events.push(SinkEvent::Press(key));
    }

    fn release(&mut self, key: OutputKey) {
        self.events.push(SinkEvent::Release(key));
    }
}

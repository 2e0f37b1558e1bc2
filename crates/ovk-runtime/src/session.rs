#![forbid(unsafe_code)]

//! One virtual-keyboard session.
//!
//! A [`Session`] owns every piece of transient overlay state: visibility,
//! the navigation selection, per-key pressed/toggle flags, the edge
//! detectors over every raw input source, and the release countdown. The
//! overlay descriptor itself stays caller-owned; [`Session::install`]
//! derives fresh state from it and [`Session::update`] borrows it again
//! each frame. Independent sessions never share state.
//!
//! # Frame protocol
//!
//! [`Session::update`] runs a strict order: (1) tick the release timer,
//! (2) process input edges into events, (3) composite the frame. The order
//! is behavior-bearing: compositing before the tick would show a stale
//! highlight for one frame.
//!
//! # Key semantics
//!
//! - *Momentary* keys: activation emits `press` (preceded by a `press` for
//!   every latched toggle key, re-asserting modifiers), then the countdown
//!   releases them after the configured hold duration.
//! - *Toggle* keys: activation flips the latched `PRESSED` flag in place
//!   and emits nothing on its own; the latched key surfaces to the host
//!   only as the modifier re-assertion above. (Open for product
//!   confirmation whether the flip itself should also emit, but this is
//!   the long-standing observed behavior and is preserved as such.)
//!
//! While the countdown is running, navigation and activation inputs are
//! consumed without effect, so the selection cannot move mid-commit.

use ovk_core::edge::{BitLatch, Edge, EdgeDetector, ScanEdges};
use ovk_core::event::{DeviceKind, InputSource, JoypadButton, KeyEventSink, RawInput, ScanCode};
use ovk_core::keytable::KeyMeta;
use ovk_core::overlay::Overlay;
use ovk_core::{debug, trace};
use ovk_render::compositor::{self, CompositeOpts};
use ovk_render::framebuffer::FrameTarget;

/// Number of input ports a session polls.
pub const MAX_PORTS: usize = 2;

/// Keyboard bindings for overlay navigation: pad-button slot, scan code.
const NAV_BINDINGS: [(JoypadButton, ScanCode); 4] = [
    (JoypadButton::Up, ScanCode::UP),
    (JoypadButton::Down, ScanCode::DOWN),
    (JoypadButton::Left, ScanCode::LEFT),
    (JoypadButton::Right, ScanCode::RIGHT),
];

/// Countdown until the pending key release fires. `<= 0` means idle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseTimer {
    remaining: i32,
}

impl ReleaseTimer {
    /// Start the countdown.
    pub fn arm(&mut self, hold_ms: i32) {
        self.remaining = hold_ms;
    }

    /// Is the timer idle (no release pending)?
    #[inline]
    pub const fn idle(&self) -> bool {
        self.remaining <= 0
    }

    /// Advance by `dt` milliseconds.
    ///
    /// Returns true exactly on the tick that crosses to idle; re-ticking an
    /// idle timer is a no-op.
    pub fn tick(&mut self, dt: i32) -> bool {
        if self.remaining > 0 {
            self.remaining -= dt;
            self.remaining <= 0
        } else {
            false
        }
    }
}

/// All transient state of one on-screen keyboard.
#[derive(Debug, Default)]
pub struct Session {
    installed: bool,
    visible: bool,
    selected: usize,
    /// Key committed by the last momentary activation, pending release.
    armed: Option<usize>,
    meta: Vec<KeyMeta>,
    joy: [EdgeDetector; MAX_PORTS],
    /// Keyboard-driven navigation edges, tracked apart from the pad bits so
    /// both sources can drive navigation without double-firing.
    nav: EdgeDetector,
    nav_return_held: bool,
    scans: ScanEdges,
    select_latch: BitLatch,
    toggle_key_latch: BitLatch,
    timer: ReleaseTimer,
}

impl Session {
    /// A session with no overlay installed. [`Session::update`] is a no-op
    /// until [`Session::install`] runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an overlay descriptor, resetting all transient state.
    ///
    /// The overlay starts hidden with the table's first key selected and
    /// the timer idle. Per-key toggle semantics are seeded from the key
    /// records. Call again at any time to swap overlays; nothing leaks
    /// from the previous one.
    pub fn install(&mut self, overlay: &Overlay<'_>) {
        let keys = overlay.keys();

        self.installed = true;
        self.visible = false;
        self.selected = 0;
        self.armed = None;
        self.timer = ReleaseTimer::default();
        for edges in &mut self.joy {
            edges.reset();
        }
        self.nav.reset();
        self.nav_return_held = false;
        self.scans.reset();
        self.select_latch.reset();
        self.toggle_key_latch.reset();
        self.meta.clear();
        self.meta.extend(keys.records().iter().map(|k| {
            if k.toggle {
                KeyMeta::TOGGLE
            } else {
                KeyMeta::empty()
            }
        }));

        debug!(keys = keys.len(), "overlay installed");
    }

    /// Is the overlay currently shown?
    #[inline]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Table index of the key holding navigation focus.
    #[inline]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Is a key release pending on the countdown?
    #[inline]
    pub const fn release_pending(&self) -> bool {
        !self.timer.idle()
    }

    /// Per-key flags, indexed like the overlay's key table.
    #[inline]
    pub fn key_meta(&self) -> &[KeyMeta] {
        &self.meta
    }

    /// Run one frame.
    ///
    /// `devices` selects what is connected to each port; `hold_ms` is the
    /// momentary-key hold duration and `dt` the elapsed time since the
    /// previous frame, both in milliseconds. All effects are `sink` calls
    /// and writes into `target`. A session with no installed overlay does
    /// nothing.
    ///
    /// The caller must pass the same overlay installed last (or install the
    /// new one first); the destination region must fit 320×240 at the scale
    /// requested in `opts`.
    #[allow(clippy::too_many_arguments)]
    pub fn update<I, S>(
        &mut self,
        overlay: &Overlay<'_>,
        input: &I,
        devices: [DeviceKind; MAX_PORTS],
        sink: &mut S,
        target: &mut FrameTarget<'_>,
        opts: CompositeOpts,
        hold_ms: i32,
        dt: i32,
    ) where
        I: InputSource + ?Sized,
        S: KeyEventSink + ?Sized,
    {
        if !self.installed {
            return;
        }
        debug_assert_eq!(
            self.meta.len(),
            overlay.keys().len(),
            "update called with a different overlay than installed"
        );

        if self.timer.tick(dt) {
            self.fire_release(overlay, sink);
        }

        self.poll_visibility_toggles(overlay, input, devices);

        for port in 0..MAX_PORTS {
            match devices[port] {
                DeviceKind::Joypad => self.poll_joypad(overlay, input, port, sink, hold_ms),
                DeviceKind::Keyboard => self.poll_keyboard(overlay, input, port, sink, hold_ms),
                DeviceKind::None => {}
            }
        }

        compositor::composite(
            overlay,
            &mut self.meta,
            self.selected,
            self.visible,
            target,
            opts,
        );
    }

    /// Show/hide edges from the dedicated toggle inputs.
    ///
    /// Each toggle source has its own one-bit latch, independent of the
    /// general edge bitsets, so holding the input flips visibility exactly
    /// once.
    fn poll_visibility_toggles<I>(
        &mut self,
        overlay: &Overlay<'_>,
        input: &I,
        devices: [DeviceKind; MAX_PORTS],
    ) where
        I: InputSource + ?Sized,
    {
        let select_down = devices.iter().enumerate().any(|(port, kind)| {
            *kind == DeviceKind::Joypad
                && input.is_down(port, RawInput::Pad(JoypadButton::Select))
        });
        if self.select_latch.rise(select_down) {
            self.visible = !self.visible;
            debug!(visible = self.visible, "visibility toggled by pad select");
        }

        if let Some(code) = overlay.toggle_scan() {
            let toggle_down = devices.iter().enumerate().any(|(port, kind)| {
                *kind == DeviceKind::Keyboard && input.is_down(port, RawInput::Key(code))
            });
            if self.toggle_key_latch.rise(toggle_down) {
                self.visible = !self.visible;
                debug!(visible = self.visible, "visibility toggled by keyboard");
            }
        }
    }

    /// Poll one joypad port.
    ///
    /// Hidden: buttons map 1:1 through the button→key map. Visible with an
    /// idle timer: press edges drive navigation. Visible mid-countdown: the
    /// stored bits freeze, so nothing fires until the release lands.
    fn poll_joypad<I, S>(
        &mut self,
        overlay: &Overlay<'_>,
        input: &I,
        port: usize,
        sink: &mut S,
        hold_ms: i32,
    ) where
        I: InputSource + ?Sized,
        S: KeyEventSink + ?Sized,
    {
        for button in JoypadButton::ALL {
            if button == JoypadButton::Select {
                continue;
            }

            let is_down = input.is_down(port, RawInput::Pad(button));

            if !self.visible {
                let key = overlay.joymap(button.index());
                match self.joy[port].sample(button, is_down) {
                    Some(Edge::Press) if key.is_some() => sink.press(key),
                    Some(Edge::Release) if key.is_some() => sink.release(key),
                    _ => {}
                }
            } else if self.timer.idle()
                && self.joy[port].sample(button, is_down) == Some(Edge::Press)
            {
                self.navigate(overlay, button, sink, hold_ms);
            }
        }
    }

    /// Poll one keyboard port.
    ///
    /// Hidden: every key record's scan code maps 1:1 to its output key.
    /// Visible with an idle timer: arrows and Return drive navigation.
    fn poll_keyboard<I, S>(
        &mut self,
        overlay: &Overlay<'_>,
        input: &I,
        port: usize,
        sink: &mut S,
        hold_ms: i32,
    ) where
        I: InputSource + ?Sized,
        S: KeyEventSink + ?Sized,
    {
        if !self.visible {
            for key in overlay.keys().records() {
                let is_down = input.is_down(port, RawInput::Key(key.scan));
                match self.scans.sample(key.scan, is_down) {
                    Some(Edge::Press) => sink.press(key.mapped),
                    Some(Edge::Release) => sink.release(key.mapped),
                    None => {}
                }
            }
        } else if self.timer.idle() {
            self.poll_keyboard_nav(overlay, input, port, sink, hold_ms);
        }
    }

    /// Keyboard-driven navigation.
    ///
    /// Uses the dedicated navigation bitset, and only acts on a key whose
    /// pad counterpart is not already held, so a pad and a keyboard moving
    /// the same selection never double-fire.
    fn poll_keyboard_nav<I, S>(
        &mut self,
        overlay: &Overlay<'_>,
        input: &I,
        port: usize,
        sink: &mut S,
        hold_ms: i32,
    ) where
        I: InputSource + ?Sized,
        S: KeyEventSink + ?Sized,
    {
        for (button, code) in NAV_BINDINGS {
            let is_down = input.is_down(port, RawInput::Key(code));
            if is_down {
                if !self.nav.is_held(button) && !self.any_joy_held(button) {
                    self.nav.set(button);
                    self.navigate(overlay, button, sink, hold_ms);
                }
            } else {
                self.nav.clear(button);
            }
        }

        let is_down = input.is_down(port, RawInput::Key(ScanCode::RETURN));
        if is_down {
            if !self.nav_return_held
                && !self.any_joy_held(JoypadButton::A)
                && !self.any_joy_held(JoypadButton::B)
            {
                self.nav_return_held = true;
                self.activate(overlay, sink, hold_ms);
            }
        } else {
            self.nav_return_held = false;
        }
    }

    fn any_joy_held(&self, button: JoypadButton) -> bool {
        self.joy.iter().any(|edges| edges.is_held(button))
    }

    /// One navigation press edge: move the selection or activate.
    fn navigate<S>(
        &mut self,
        overlay: &Overlay<'_>,
        button: JoypadButton,
        sink: &mut S,
        hold_ms: i32,
    ) where
        S: KeyEventSink + ?Sized,
    {
        let keys = overlay.keys();
        let current = keys.get(self.selected);

        match button {
            JoypadButton::Up => self.selected = keys.resolve(current.up),
            JoypadButton::Down => self.selected = keys.resolve(current.down),
            JoypadButton::Left => self.selected = keys.resolve(current.left),
            JoypadButton::Right => self.selected = keys.resolve(current.right),
            JoypadButton::A | JoypadButton::B => self.activate(overlay, sink, hold_ms),
            _ => {}
        }
    }

    /// The activation protocol for the selected key.
    fn activate<S>(&mut self, overlay: &Overlay<'_>, sink: &mut S, hold_ms: i32)
    where
        S: KeyEventSink + ?Sized,
    {
        let keys = overlay.keys();
        let index = self.selected;

        if self.meta[index].contains(KeyMeta::TOGGLE) {
            // Visual-only flip; emission happens as modifier re-assertion
            // on the next momentary commit.
            self.meta[index].toggle(KeyMeta::PRESSED);
            trace!(key = keys.get(index).id.0, "toggle key flipped");
            return;
        }

        // Re-assert latched modifiers so the commit lands modified.
        for (key, m) in keys.records().iter().zip(self.meta.iter()) {
            if m.contains(KeyMeta::PRESSED | KeyMeta::TOGGLE) {
                sink.press(key.mapped);
            }
        }

        let mapped = keys.get(index).mapped;
        sink.press(mapped);
        self.meta[index].insert(KeyMeta::PRESSED);
        self.armed = Some(index);
        self.timer.arm(hold_ms);
        trace!(key = keys.get(index).id.0, hold_ms, "momentary key committed");
    }

    /// The release protocol, fired when the countdown crosses to idle.
    ///
    /// Releases the armed key, then every still-pressed momentary key.
    /// Latched toggle keys are deliberately left pressed; they release only
    /// via an explicit toggle-off activation.
    fn fire_release<S>(&mut self, overlay: &Overlay<'_>, sink: &mut S)
    where
        S: KeyEventSink + ?Sized,
    {
        let keys = overlay.keys();

        if let Some(index) = self.armed.take() {
            sink.release(keys.get(index).mapped);
            self.meta[index].remove(KeyMeta::PRESSED);
        }

        for (key, m) in keys.records().iter().zip(self.meta.iter_mut()) {
            if m.contains(KeyMeta::PRESSED) && !m.contains(KeyMeta::TOGGLE) {
                sink.release(key.mapped);
                m.remove(KeyMeta::PRESSED);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_once_on_crossing() {
        let mut timer = ReleaseTimer::default();
        assert!(timer.idle());
        assert!(!timer.tick(16));

        timer.arm(100);
        assert!(!timer.idle());
        assert!(!timer.tick(40));
        assert!(!timer.tick(40));
        assert!(timer.tick(40)); // crosses to -20
        assert!(timer.idle());
        assert!(!timer.tick(40)); // idle re-tick is a no-op
    }

    #[test]
    fn timer_crosses_exactly_to_zero() {
        let mut timer = ReleaseTimer::default();
        timer.arm(32);
        assert!(!timer.tick(16));
        assert!(timer.tick(16));
        assert!(!timer.tick(16));
    }

    #[test]
    fn uninstalled_session_reports_defaults() {
        let session = Session::new();
        assert!(!session.visible());
        assert_eq!(session.selected(), 0);
        assert!(!session.release_pending());
        assert!(session.key_meta().is_empty());
    }
}

#![forbid(unsafe_code)]

//! Per-input edge detection over level-sampled state.
//!
//! Hosts report input as levels ("is this down right now"), once per frame.
//! Everything downstream wants transitions. Each tracked input gets one bit
//! of memory recording "was down last sample"; comparing the new level
//! against that bit yields exactly one [`Edge::Press`] and one
//! [`Edge::Release`] per physical press, no matter how many frames the
//! input stays held.
//!
//! Three shapes cover every tracked source:
//!
//! - [`EdgeDetector`]: one 16-bit word, for a pad's buttons.
//! - [`ScanEdges`]: a word array covering keyboard scan codes `0..512`.
//! - [`BitLatch`]: a single bit, for the visibility-toggle inputs.

use crate::event::{JoypadButton, ScanCode};

/// A press or release transition derived from two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Transition low→high.
    Press,
    /// Transition high→low.
    Release,
}

/// Edge state for one joypad's sixteen buttons.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    bits: u16,
}

impl EdgeDetector {
    /// Fresh detector with no buttons held.
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Feed one sampled level; returns the transition, if any.
    pub fn sample(&mut self, button: JoypadButton, is_down: bool) -> Option<Edge> {
        let bit = 1u16 << button.index();

        if is_down {
            if self.bits & bit == 0 {
                self.bits |= bit;
                return Some(Edge::Press);
            }
        } else if self.bits & bit != 0 {
            self.bits &= !bit;
            return Some(Edge::Release);
        }

        None
    }

    /// Was this button down at its last sample?
    #[inline]
    pub const fn is_held(&self, button: JoypadButton) -> bool {
        self.bits & (1 << button.index()) != 0
    }

    /// Mark a button held without emitting an edge.
    #[inline]
    pub fn set(&mut self, button: JoypadButton) {
        self.bits |= 1 << button.index();
    }

    /// Drop a button's stored bit without emitting an edge.
    #[inline]
    pub fn clear(&mut self, button: JoypadButton) {
        self.bits &= !(1 << button.index());
    }

    /// Forget all held state.
    pub fn reset(&mut self) {
        self.bits = 0;
    }
}

/// Number of 32-bit words backing [`ScanEdges`].
const SCAN_WORDS: usize = (ScanCode::MAX as usize + 1).div_ceil(32);

/// Edge state for keyboard scan codes `0..512`.
///
/// Same contract as [`EdgeDetector`], addressed by scan code. Codes above
/// [`ScanCode::MAX`] are ignored (sampled as a permanent no-transition).
#[derive(Debug, Clone, Copy)]
pub struct ScanEdges {
    words: [u32; SCAN_WORDS],
}

impl Default for ScanEdges {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanEdges {
    /// Fresh detector with no keys held.
    pub const fn new() -> Self {
        Self {
            words: [0; SCAN_WORDS],
        }
    }

    /// Feed one sampled level; returns the transition, if any.
    pub fn sample(&mut self, code: ScanCode, is_down: bool) -> Option<Edge> {
        if code.0 > ScanCode::MAX {
            return None;
        }

        let word = code.0 as usize / 32;
        let bit = 1u32 << (code.0 & 31);

        if is_down {
            if self.words[word] & bit == 0 {
                self.words[word] |= bit;
                return Some(Edge::Press);
            }
        } else if self.words[word] & bit != 0 {
            self.words[word] &= !bit;
            return Some(Edge::Release);
        }

        None
    }

    /// Forget all held state.
    pub fn reset(&mut self) {
        self.words = [0; SCAN_WORDS];
    }
}

/// One-bit edge detector for toggle-style inputs.
///
/// [`BitLatch::rise`] is true only on the frame the input goes down, so a
/// held toggle button flips its target exactly once per press.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitLatch {
    held: bool,
}

impl BitLatch {
    /// Fresh latch, not held.
    pub const fn new() -> Self {
        Self { held: false }
    }

    /// Feed one sampled level; true exactly on the low→high transition.
    pub fn rise(&mut self, is_down: bool) -> bool {
        let rose = is_down && !self.held;
        self.held = is_down;
        rose
    }

    /// Forget held state.
    pub fn reset(&mut self) {
        self.held = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_fires_one_press_and_one_release() {
        let mut edges = EdgeDetector::new();

        assert_eq!(edges.sample(JoypadButton::A, true), Some(Edge::Press));
        for _ in 0..100 {
            assert_eq!(edges.sample(JoypadButton::A, true), None);
        }
        assert!(edges.is_held(JoypadButton::A));

        assert_eq!(edges.sample(JoypadButton::A, false), Some(Edge::Release));
        for _ in 0..100 {
            assert_eq!(edges.sample(JoypadButton::A, false), None);
        }
        assert!(!edges.is_held(JoypadButton::A));
    }

    #[test]
    fn buttons_track_independently() {
        let mut edges = EdgeDetector::new();
        assert_eq!(edges.sample(JoypadButton::Up, true), Some(Edge::Press));
        assert_eq!(edges.sample(JoypadButton::Down, true), Some(Edge::Press));
        assert_eq!(edges.sample(JoypadButton::Up, false), Some(Edge::Release));
        assert!(edges.is_held(JoypadButton::Down));
        assert!(!edges.is_held(JoypadButton::Up));
    }

    #[test]
    fn clear_drops_bit_without_edge() {
        let mut edges = EdgeDetector::new();
        edges.sample(JoypadButton::B, true);
        edges.clear(JoypadButton::B);
        // Re-press after a silent clear is a fresh edge.
        assert_eq!(edges.sample(JoypadButton::B, true), Some(Edge::Press));
    }

    #[test]
    fn scan_edges_cover_word_boundaries() {
        let mut edges = ScanEdges::new();
        for code in [0u16, 31, 32, 63, 64, ScanCode::MAX] {
            assert_eq!(edges.sample(ScanCode(code), true), Some(Edge::Press));
            assert_eq!(edges.sample(ScanCode(code), true), None);
            assert_eq!(edges.sample(ScanCode(code), false), Some(Edge::Release));
        }
    }

    #[test]
    fn scan_edges_ignore_out_of_range_codes() {
        let mut edges = ScanEdges::new();
        assert_eq!(edges.sample(ScanCode(ScanCode::MAX + 1), true), None);
        assert_eq!(edges.sample(ScanCode(u16::MAX), true), None);
    }

    #[test]
    fn latch_rises_once_per_held_run() {
        let mut latch = BitLatch::new();
        assert!(latch.rise(true));
        for _ in 0..50 {
            assert!(!latch.rise(true));
        }
        assert!(!latch.rise(false));
        assert!(latch.rise(true));
    }

}

/// Property tests for edge detection.
///
/// Top-level `#[cfg(test)]` scope: the `proptest!` macro has edition-2024
/// compatibility issues when nested inside another test module.
#[cfg(test)]
mod edge_proptests {
    use super::{Edge, EdgeDetector, ScanEdges};
    use crate::event::{JoypadButton, ScanCode};
    use proptest::prelude::*;

    proptest! {
        /// Holding an input for N frames yields exactly one press, and
        /// releasing for M frames exactly one release.
        #[test]
        fn edge_idempotence(n in 1usize..200, m in 1usize..200) {
            let mut edges = EdgeDetector::new();
            let mut presses = 0;
            let mut releases = 0;

            for _ in 0..n {
                match edges.sample(JoypadButton::X, true) {
                    Some(Edge::Press) => presses += 1,
                    Some(Edge::Release) => releases += 1,
                    None => {}
                }
            }
            for _ in 0..m {
                match edges.sample(JoypadButton::X, false) {
                    Some(Edge::Press) => presses += 1,
                    Some(Edge::Release) => releases += 1,
                    None => {}
                }
            }

            prop_assert_eq!(presses, 1);
            prop_assert_eq!(releases, 1);
        }

        /// An arbitrary level sequence always alternates press/release.
        #[test]
        fn edges_alternate(levels in proptest::collection::vec(any::<bool>(), 1..300)) {
            let mut edges = ScanEdges::new();
            let mut last = None;

            for level in levels {
                if let Some(edge) = edges.sample(ScanCode(40), level) {
                    prop_assert_ne!(Some(edge), last);
                    last = Some(edge);
                }
            }
        }
    }
}

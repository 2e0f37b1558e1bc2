#![forbid(unsafe_code)]

//! The overlay descriptor.
//!
//! An [`Overlay`] is the caller-supplied, immutable description of one
//! virtual keyboard: the 320×240 base image, the key table, the pad
//! button→key map, and the rectangle lookup used for highlights. The core
//! never owns one; sessions borrow it per call and keep only derived
//! per-key state, so the same descriptor can back any number of sessions.

use crate::event::{OutputKey, ScanCode};
use crate::geometry::Rect;
use crate::keytable::{Key, KeyTable};

/// Overlay base image width in pixels.
pub const OVERLAY_WIDTH: usize = 320;
/// Overlay base image height in pixels.
pub const OVERLAY_HEIGHT: usize = 240;
/// Pixel count of the base image.
pub const OVERLAY_PIXELS: usize = OVERLAY_WIDTH * OVERLAY_HEIGHT;

/// Resolves a key record to its highlight rectangle, in overlay coordinates.
pub type GetRect = fn(&Key) -> Rect;

/// Immutable description of one virtual keyboard.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    image: &'a [u16],
    keys: KeyTable<'a>,
    joymap: [OutputKey; 16],
    toggle_scan: Option<ScanCode>,
    get_rect: GetRect,
}

impl<'a> Overlay<'a> {
    /// Create an overlay descriptor.
    ///
    /// `joymap` maps pad button index to the host key emitted while the
    /// overlay is hidden; [`OutputKey::NONE`] entries emit nothing. The
    /// Select slot is never consulted (Select toggles visibility).
    /// `toggle_scan` names the keyboard key that toggles visibility on
    /// keyboard-driven ports, or `None` to disable the keyboard toggle.
    ///
    /// # Panics
    ///
    /// Panics if `image` is not exactly 320×240 pixels or `keys` is empty.
    pub fn new(
        image: &'a [u16],
        keys: &'a [Key],
        joymap: [OutputKey; 16],
        toggle_scan: Option<ScanCode>,
        get_rect: GetRect,
    ) -> Self {
        assert_eq!(
            image.len(),
            OVERLAY_PIXELS,
            "overlay image must be exactly {OVERLAY_WIDTH}x{OVERLAY_HEIGHT} pixels"
        );

        Self {
            image,
            keys: KeyTable::new(keys),
            joymap,
            toggle_scan,
            get_rect,
        }
    }

    /// The 320×240 RGB565 base image, row-major.
    #[inline]
    pub const fn image(&self) -> &'a [u16] {
        self.image
    }

    /// The key table.
    #[inline]
    pub const fn keys(&self) -> KeyTable<'a> {
        self.keys
    }

    /// Host key for a pad button index while hidden.
    #[inline]
    pub const fn joymap(&self, button_index: usize) -> OutputKey {
        self.joymap[button_index]
    }

    /// Keyboard visibility-toggle key, if any.
    #[inline]
    pub const fn toggle_scan(&self) -> Option<ScanCode> {
        self.toggle_scan
    }

    /// Highlight rectangle for a key.
    #[inline]
    pub fn rect_of(&self, key: &Key) -> Rect {
        (self.get_rect)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytable::KeyId;

    fn key(id: u16) -> Key {
        Key {
            id: KeyId(id),
            up: KeyId::END,
            down: KeyId::END,
            left: KeyId::END,
            right: KeyId::END,
            mapped: OutputKey(id),
            scan: ScanCode(id),
            toggle: false,
        }
    }

    fn rect_stub(_key: &Key) -> Rect {
        Rect::new(4, 8, 15, 16)
    }

    #[test]
    fn overlay_wires_through_accessors() {
        let image = vec![0u16; OVERLAY_PIXELS];
        let keys = [key(1), key(2)];
        let mut joymap = [OutputKey::NONE; 16];
        joymap[8] = OutputKey(90);

        let ovl = Overlay::new(&image, &keys, joymap, Some(ScanCode::TAB), rect_stub);
        assert_eq!(ovl.keys().len(), 2);
        assert_eq!(ovl.joymap(8), OutputKey(90));
        assert_eq!(ovl.joymap(0), OutputKey::NONE);
        assert_eq!(ovl.toggle_scan(), Some(ScanCode::TAB));
        assert_eq!(ovl.rect_of(ovl.keys().get(0)), Rect::new(4, 8, 15, 16));
    }

    #[test]
    #[should_panic(expected = "320x240")]
    fn wrong_image_size_panics() {
        let image = vec![0u16; 100];
        let keys = [key(1)];
        Overlay::new(&image, &keys, [OutputKey::NONE; 16], None, rect_stub);
    }
}

#![forbid(unsafe_code)]

//! The overlay compositor.
//!
//! One read-only pass over session state into the destination framebuffer:
//! base image first (four variants for the transparency × scale
//! combinations), then an inverted-pixel highlight over every key that is
//! pressed or selected. Runs at native-resolution cost every frame while
//! the overlay is visible; a hidden overlay draws nothing.
//!
//! # Invariants
//!
//! 1. `SELECTED` is set on the current selection, consumed, and cleared
//!    within a single [`composite`] call; it is never observable between
//!    frames.
//! 2. Highlighting is bitwise inversion, which is its own inverse: drawing
//!    a key highlighted and then unhighlighted restores the destination
//!    bit for bit (the base pass permitting).

use smallvec::SmallVec;

use ovk_core::geometry::Rect;
use ovk_core::keytable::KeyMeta;
use ovk_core::overlay::Overlay;

use crate::framebuffer::{FrameTarget, overlay_extent};

/// Per-channel mask used by the transparent blend.
///
/// RGB565 with the low two bits of each channel dropped, so the weighted
/// add in [`blend`] cannot carry across channel boundaries.
pub const BLEND_MASK: u16 = 0xE79C;

/// How to draw the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeOpts {
    /// Blend with existing framebuffer contents instead of overwriting.
    pub transparent: bool,
    /// 2x nearest-neighbor upscale into a double-pitch destination.
    pub scale2x: bool,
}

/// Approximate 75/25 source-over blend of two RGB565 pixels.
///
/// Computes `((src & MASK) * 3 + (dst & MASK)) >> 2` with [`BLEND_MASK`]
/// isolating the non-carry bits of each channel, giving a cheap weighted
/// blend without unpacking the channels.
#[inline]
pub const fn blend(src: u16, dst: u16) -> u16 {
    let src = (src & BLEND_MASK) as u32;
    let dst = (dst & BLEND_MASK) as u32;
    ((src * 3 + dst) >> 2) as u16
}

/// Draw the overlay into the destination framebuffer.
///
/// No-op while hidden. Otherwise draws the base image per `opts`, then
/// inverts the rectangle of every key flagged `PRESSED` or `SELECTED`.
/// `meta` is the session's per-key flag array; the current selection is
/// marked `SELECTED` for the duration of the call only.
///
/// # Panics
///
/// Panics if the target region cannot hold 320×240 at the requested scale
/// (caller contract), or if `meta` does not match the key table length.
pub fn composite(
    overlay: &Overlay<'_>,
    meta: &mut [KeyMeta],
    selected: usize,
    visible: bool,
    target: &mut FrameTarget<'_>,
    opts: CompositeOpts,
) {
    if !visible {
        return;
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("composite", ?opts).entered();

    let keys = overlay.keys();
    assert_eq!(meta.len(), keys.len(), "meta length must match key table");

    let (width, height) = overlay_extent(opts.scale2x);
    target.check_extent(width, height);

    match (opts.transparent, opts.scale2x) {
        (false, false) => target.copy_1x(overlay.image()),
        (false, true) => target.copy_2x(overlay.image()),
        (true, false) => target.blend_1x(overlay.image()),
        (true, true) => target.blend_2x(overlay.image()),
    }

    meta[selected].insert(KeyMeta::SELECTED);

    let mut highlights: SmallVec<[Rect; 8]> = SmallVec::new();
    for (key, m) in keys.records().iter().zip(meta.iter()) {
        if m.intersects(KeyMeta::PRESSED | KeyMeta::SELECTED) {
            let rect = overlay.rect_of(key);
            if !rect.is_empty() {
                highlights.push(rect);
            }
        }
    }

    for rect in highlights {
        if opts.scale2x {
            target.invert_2x(rect);
        } else {
            target.invert_1x(rect);
        }
    }

    meta[selected].remove(KeyMeta::SELECTED);
}

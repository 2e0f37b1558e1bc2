#![forbid(unsafe_code)]

//! Caller-framebuffer access.
//!
//! The destination framebuffer belongs to the host; the core borrows a
//! region of it for one draw call as a [`FrameTarget`]. Pixels are packed
//! RGB565 (`u16`), row-major with an explicit pitch in pixels, which may
//! exceed the drawn width (padded rows are never touched).
//!
//! # Invariants
//!
//! 1. `pitch` never changes after creation.
//! 2. Drawing primitives touch only pixels inside the requested extent;
//!    padding between `width` and `pitch` is preserved.
//! 3. Extent capacity is asserted up front ([`FrameTarget::check_extent`]),
//!    so the per-pixel loops index without surprise panics.

use ovk_core::geometry::Rect;
use ovk_core::overlay::{OVERLAY_HEIGHT, OVERLAY_WIDTH};

/// A mutable view over a caller-owned RGB565 framebuffer region.
#[derive(Debug)]
pub struct FrameTarget<'a> {
    pixels: &'a mut [u16],
    pitch: usize,
}

impl<'a> FrameTarget<'a> {
    /// Wrap a framebuffer region.
    ///
    /// `pitch` is the distance between row starts, in pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pitch` is zero.
    pub fn new(pixels: &'a mut [u16], pitch: usize) -> Self {
        assert!(pitch > 0, "framebuffer pitch must be > 0");
        Self { pixels, pitch }
    }

    /// Row pitch in pixels.
    #[inline]
    pub const fn pitch(&self) -> usize {
        self.pitch
    }

    /// The wrapped pixels.
    #[inline]
    pub fn pixels(&self) -> &[u16] {
        self.pixels
    }

    /// Assert the region can hold `width`×`height` pixels at this pitch.
    ///
    /// # Panics
    ///
    /// Panics if the pitch is narrower than `width` or the slice is too
    /// short. This is the caller contract from the overlay descriptor: the
    /// destination must fit the overlay at the requested scale.
    pub fn check_extent(&self, width: usize, height: usize) {
        assert!(
            self.pitch >= width,
            "framebuffer pitch {} is narrower than drawn width {width}",
            self.pitch
        );
        let required = self.pitch * (height - 1) + width;
        assert!(
            self.pixels.len() >= required,
            "framebuffer region too small: {} pixels, need {required}",
            self.pixels.len()
        );
    }

    /// Copy the 320×240 source image, overwriting the destination.
    pub(crate) fn copy_1x(&mut self, src: &[u16]) {
        for (y, src_row) in src.chunks_exact(OVERLAY_WIDTH).enumerate() {
            let start = y * self.pitch;
            self.pixels[start..start + OVERLAY_WIDTH].copy_from_slice(src_row);
        }
    }

    /// Copy the source image with 2x nearest-neighbor upscale.
    pub(crate) fn copy_2x(&mut self, src: &[u16]) {
        for (y, src_row) in src.chunks_exact(OVERLAY_WIDTH).enumerate() {
            let top = y * 2 * self.pitch;
            let bottom = top + self.pitch;

            for (x, &pixel) in src_row.iter().enumerate() {
                self.pixels[top + x * 2] = pixel;
                self.pixels[top + x * 2 + 1] = pixel;
                self.pixels[bottom + x * 2] = pixel;
                self.pixels[bottom + x * 2 + 1] = pixel;
            }
        }
    }

    /// Blend the source image over the destination at 1x.
    pub(crate) fn blend_1x(&mut self, src: &[u16]) {
        for (y, src_row) in src.chunks_exact(OVERLAY_WIDTH).enumerate() {
            let start = y * self.pitch;
            let dst_row = &mut self.pixels[start..start + OVERLAY_WIDTH];

            for (dst, &pixel) in dst_row.iter_mut().zip(src_row) {
                *dst = crate::compositor::blend(pixel, *dst);
            }
        }
    }

    /// Blend the source image over the destination with 2x upscale.
    pub(crate) fn blend_2x(&mut self, src: &[u16]) {
        for (y, src_row) in src.chunks_exact(OVERLAY_WIDTH).enumerate() {
            let top = y * 2 * self.pitch;
            let bottom = top + self.pitch;

            for (x, &pixel) in src_row.iter().enumerate() {
                for index in [top + x * 2, top + x * 2 + 1, bottom + x * 2, bottom + x * 2 + 1] {
                    self.pixels[index] = crate::compositor::blend(pixel, self.pixels[index]);
                }
            }
        }
    }

    /// Bitwise-invert a rectangle, at 1x.
    pub(crate) fn invert_1x(&mut self, rect: Rect) {
        for y in rect.y..rect.bottom() {
            let start = y as usize * self.pitch;
            for x in rect.x..rect.right() {
                self.pixels[start + x as usize] = !self.pixels[start + x as usize];
            }
        }
    }

    /// Bitwise-invert a rectangle given in 1x coordinates, on a 2x frame.
    pub(crate) fn invert_2x(&mut self, rect: Rect) {
        for y in rect.y..rect.bottom() {
            let top = y as usize * 2 * self.pitch;
            let bottom = top + self.pitch;

            for x in rect.x..rect.right() {
                let x2 = x as usize * 2;
                self.pixels[top + x2] = !self.pixels[top + x2];
                self.pixels[top + x2 + 1] = !self.pixels[top + x2 + 1];
                self.pixels[bottom + x2] = !self.pixels[bottom + x2];
                self.pixels[bottom + x2 + 1] = !self.pixels[bottom + x2 + 1];
            }
        }
    }
}

/// Required extent for the overlay at a given scale.
pub(crate) const fn overlay_extent(scale2x: bool) -> (usize, usize) {
    if scale2x {
        (OVERLAY_WIDTH * 2, OVERLAY_HEIGHT * 2)
    } else {
        (OVERLAY_WIDTH, OVERLAY_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovk_core::overlay::OVERLAY_PIXELS;

    #[test]
    fn copy_1x_preserves_row_padding() {
        let src: Vec<u16> = (0..OVERLAY_PIXELS as u32).map(|i| i as u16).collect();
        let pitch = OVERLAY_WIDTH + 5;
        let mut fb = vec![0xAAAA_u16; pitch * OVERLAY_HEIGHT];

        let mut target = FrameTarget::new(&mut fb, pitch);
        target.copy_1x(&src);

        assert_eq!(fb[0], src[0]);
        assert_eq!(fb[pitch], src[OVERLAY_WIDTH]);
        // Padding between rows untouched.
        assert_eq!(fb[OVERLAY_WIDTH], 0xAAAA);
        assert_eq!(fb[pitch + OVERLAY_WIDTH + 4], 0xAAAA);
    }

    #[test]
    fn copy_2x_duplicates_each_pixel() {
        let mut src = vec![0u16; OVERLAY_PIXELS];
        src[0] = 0x1234;
        src[OVERLAY_WIDTH] = 0x5678; // first pixel of second source row

        let pitch = OVERLAY_WIDTH * 2;
        let mut fb = vec![0u16; pitch * OVERLAY_HEIGHT * 2];

        let mut target = FrameTarget::new(&mut fb, pitch);
        target.copy_2x(&src);

        assert_eq!(fb[0], 0x1234);
        assert_eq!(fb[1], 0x1234);
        assert_eq!(fb[pitch], 0x1234);
        assert_eq!(fb[pitch + 1], 0x1234);
        // Second source row lands two destination rows down.
        assert_eq!(fb[pitch * 2], 0x5678);
        assert_eq!(fb[pitch * 3 + 1], 0x5678);
    }

    #[test]
    fn invert_twice_restores_pixels() {
        let pitch = OVERLAY_WIDTH;
        let original: Vec<u16> = (0..pitch as u32 * 40).map(|i| (i * 7) as u16).collect();
        let mut fb = original.clone();

        let mut target = FrameTarget::new(&mut fb, pitch);
        let rect = Rect::new(3, 5, 17, 11);
        target.invert_1x(rect);
        assert_ne!(target.pixels()[5 * pitch + 3], original[5 * pitch + 3]);
        target.invert_1x(rect);

        assert_eq!(fb, original);
    }

    #[test]
    fn invert_2x_touches_the_scaled_rect() {
        let pitch = OVERLAY_WIDTH * 2;
        let mut fb = vec![0u16; pitch * OVERLAY_HEIGHT * 2];

        let mut target = FrameTarget::new(&mut fb, pitch);
        target.invert_2x(Rect::new(1, 1, 1, 1));

        // One 1x pixel becomes a 2x2 block at (2, 2).
        assert_eq!(fb[2 * pitch + 2], 0xFFFF);
        assert_eq!(fb[2 * pitch + 3], 0xFFFF);
        assert_eq!(fb[3 * pitch + 2], 0xFFFF);
        assert_eq!(fb[3 * pitch + 3], 0xFFFF);
        assert_eq!(fb[2 * pitch + 4], 0);
        assert_eq!(fb[4 * pitch + 2], 0);
    }

    #[test]
    #[should_panic(expected = "too small")]
    fn short_region_fails_extent_check() {
        let mut fb = vec![0u16; 100];
        let target = FrameTarget::new(&mut fb, OVERLAY_WIDTH);
        target.check_extent(OVERLAY_WIDTH, OVERLAY_HEIGHT);
    }

    #[test]
    #[should_panic(expected = "narrower")]
    fn narrow_pitch_fails_extent_check() {
        let mut fb = vec![0u16; OVERLAY_PIXELS * 4];
        let target = FrameTarget::new(&mut fb, OVERLAY_WIDTH);
        target.check_extent(OVERLAY_WIDTH * 2, OVERLAY_HEIGHT * 2);
    }
}

/// Property tests for highlight inversion.
///
/// Top-level `#[cfg(test)]` scope: the `proptest!` macro has edition-2024
/// compatibility issues when nested inside another test module.
#[cfg(test)]
mod invert_proptests {
    use super::FrameTarget;
    use ovk_core::geometry::Rect;
    use proptest::prelude::*;

    proptest! {
        /// Inverting a rectangle twice restores the buffer bit for bit.
        #[test]
        fn invert_twice_is_identity(
            pixels in proptest::collection::vec(any::<u16>(), 64 * 64),
            x in 0u16..48,
            y in 0u16..48,
            w in 1u16..16,
            h in 1u16..16,
        ) {
            let mut fb = pixels.clone();
            let mut target = FrameTarget::new(&mut fb, 64);
            let rect = Rect::new(x, y, w, h);

            target.invert_1x(rect);
            target.invert_1x(rect);

            prop_assert_eq!(fb, pixels);
        }
    }
}

#![forbid(unsafe_code)]

//! ovk public facade crate.
//!
//! An on-screen virtual keyboard overlay for frame-loop hosts: the host
//! supplies an [`Overlay`] descriptor (base image, key table, button map,
//! callbacks), polls raw input, and calls [`Session::update`] once per
//! rendered frame. This crate re-exports the stable surface of the
//! internal crates and offers a lightweight prelude.
//!
//! ```no_run
//! use ovk::prelude::*;
//!
//! struct Host;
//!
//! impl KeyEventSink for Host {
//!     fn press(&mut self, _key: OutputKey) { /* forward to the host */ }
//!     fn release(&mut self, _key: OutputKey) { /* forward to the host */ }
//! }
//!
//! # fn frame_loop(overlay: Overlay<'_>, fb: &mut [u16]) {
//! let mut session = Session::new();
//! session.install(&overlay);
//!
//! let mut host = Host;
//! let poll = |_port: usize, _input: RawInput| -> bool {
//!     false // host input backend goes here
//! };
//!
//! // once per frame:
//! let mut target = FrameTarget::new(fb, 320);
//! session.update(
//!     &overlay,
//!     &poll,
//!     [DeviceKind::Joypad, DeviceKind::None],
//!     &mut host,
//!     &mut target,
//!     CompositeOpts::default(),
//!     500, // hold duration, ms
//!     16,  // elapsed, ms
//! );
//! # }
//! ```

// --- Core re-exports -------------------------------------------------------

pub use ovk_core::edge::{BitLatch, Edge, EdgeDetector, ScanEdges};
pub use ovk_core::event::{
    DeviceKind, InputSource, JoypadButton, KeyEventSink, OutputKey, RawInput, ScanCode,
};
pub use ovk_core::geometry::Rect;
pub use ovk_core::keytable::{Key, KeyId, KeyMeta, KeyTable};
pub use ovk_core::overlay::{
    GetRect, OVERLAY_HEIGHT, OVERLAY_PIXELS, OVERLAY_WIDTH, Overlay,
};

// --- Render re-exports -----------------------------------------------------

pub use ovk_render::compositor::{BLEND_MASK, CompositeOpts, blend, composite};
pub use ovk_render::framebuffer::FrameTarget;

// --- Runtime re-exports ----------------------------------------------------

pub use ovk_runtime::{MAX_PORTS, ReleaseTimer, Session};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    //! Common imports for frame-loop hosts.
    pub use crate::{
        CompositeOpts, DeviceKind, FrameTarget, InputSource, JoypadButton, Key, KeyEventSink,
        KeyId, KeyMeta, OutputKey, Overlay, RawInput, Rect, ScanCode, Session,
    };
}

#![forbid(unsafe_code)]

//! Render kernel: framebuffer targets and the overlay compositor.

pub mod compositor;
pub mod framebuffer;

//! # touchcolor
//!
//! Picks the color under a user's finger on a live rendering surface: capture a neighborhood of
//! pixels around the touch, reduce it to one color, and remember it for the rest of the stroke.
//!
//! The estimation itself lives in [`touchcolor_core`]. This crate adds the asynchronous capture
//! layer over the host's rendering backends ([`capture`]), the per-stroke [`session`],
//! whole-surface [`palette`]s and [`settings`]. [`host`] is a purely in-memory backend, used by the
//! binary and by tests.
#![warn(clippy::pedantic)]

pub mod capture;
pub mod host;
pub mod palette;
pub mod session;
pub mod settings;

pub use capture::{CaptureError, CaptureMode, Compositor, Surface, SurfaceHandle};
pub use session::TouchSession;
pub use settings::Settings;

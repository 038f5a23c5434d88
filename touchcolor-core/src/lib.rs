//! # touchcolor-core
//!
//! The synchronous half of touch color estimation: geometry, pixel buffers, the estimators, and the
//! per-session color cache. Nothing in here knows how pixels are captured - that is the job of the
//! `touchcolor` crate, which feeds [`buffer::PixelBuffer`]s into an [`estimate::Estimator`].
#![warn(clippy::pedantic)]

pub mod buffer;
pub mod cache;
pub mod color;
pub mod estimate;
pub mod geom;
pub mod region;

pub use buffer::PixelBuffer;
pub use cache::TouchColorCache;
pub use color::ColorSample;
pub use geom::{Extent, InvalidDimensions, Point, Rect};

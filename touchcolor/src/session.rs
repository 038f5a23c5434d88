//! # Touch sessions
//!
//! A [`TouchSession`] follows one surface for as long as the user is touching it. The first touch
//! of a stroke is captured and estimated, and every later touch answers from the cache until
//! [`TouchSession::reset`].

use touchcolor_core::{
    estimate::Estimator,
    region::{compute_region, sampleable_region, ClampPolicy},
    ColorSample, Point, TouchColorCache,
};

use crate::{
    capture::{SurfaceCapturer, SurfaceHandle},
    settings::Settings,
};

#[derive(Debug)]
pub struct TouchSession {
    capturer: SurfaceCapturer,
    estimator: Estimator,
    cache: TouchColorCache,
    crop_radius: u32,
    clamp: ClampPolicy,
}
impl TouchSession {
    #[must_use]
    pub fn new(handle: SurfaceHandle, settings: &Settings) -> Self {
        Self::with_estimator(handle, settings, settings.estimator())
    }
    /// As [`TouchSession::new`], but with an estimator other than the configured one.
    #[must_use]
    pub fn with_estimator(handle: SurfaceHandle, settings: &Settings, estimator: Estimator) -> Self {
        log::debug!(
            "touch session over {handle:?}, {} capture, {} estimation",
            settings.capture,
            estimator.strategy()
        );
        Self {
            capturer: SurfaceCapturer::new(settings.capture, handle),
            estimator,
            cache: TouchColorCache::new(),
            crop_radius: settings.crop_radius,
            clamp: settings.clamp,
        }
    }
    /// The color remembered for the current stroke, if any.
    #[must_use]
    pub fn cached(&self) -> Option<ColorSample> {
        self.cache.get()
    }
    /// The color under `touch`, given in the surface's own coordinates.
    ///
    /// `None` if the capture failed or nothing could be estimated, in which case nothing is
    /// remembered and the next touch tries again.
    pub async fn color_at(&mut self, touch: Point) -> Option<ColorSample> {
        if let Some(color) = self.cache.get() {
            return Some(color);
        }

        let space = match self.capturer.capture_space() {
            Ok(space) => space,
            Err(e) => {
                log::warn!("can't capture touch at {touch}: {e}");
                return None;
            }
        };
        let touch = touch.translate(space.view_origin);
        let region = compute_region(touch, space.extent, self.crop_radius, self.clamp);
        let region = sampleable_region(region, touch, space.extent);
        log::debug!("capturing {region} around {touch}");

        let buffer = match self.capturer.capture(region).await {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("capture of {region} failed: {e}");
                return None;
            }
        };
        let center = touch.relative_to(region.origin());
        // A collapsed region leaves the touch on its far edge, one past the last pixel.
        let center = match buffer.extent() {
            Some(extent) => {
                use az::SaturatingAs;
                let (x, y) = extent.clamp_point(center);
                Point::new(x.saturating_as(), y.saturating_as())
            }
            None => center,
        };

        let color = self.estimator.estimate(buffer, center)?;
        log::debug!("touch color {color}");
        self.cache.set(color);
        Some(color)
    }
    /// Forget the remembered color, eg. at the start of a new stroke.
    pub fn reset(&mut self) {
        self.cache.reset();
    }
    /// Follow a different surface from now on. The remembered color belonged to the old one, so it
    /// is dropped.
    pub fn retarget(&mut self, handle: SurfaceHandle) {
        self.capturer = SurfaceCapturer::new(self.capturer.mode(), handle);
        self.cache.reset();
    }
    /// Detach from the surface and release everything.
    pub fn end(self) {
        self.capturer.handle().detach();
    }
}

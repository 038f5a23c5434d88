//! # Cluster-based estimation
//!
//! Delegates the actual clustering to a [`DominantColors`] collaborator, and only decides which of
//! its clusters represents the touch.

use std::num::NonZeroUsize;

use crate::{buffer::PixelBuffer, color::ColorSample};

/// One cluster reported by a [`DominantColors`] collaborator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeightedColor {
    pub color: ColorSample,
    /// Fraction of the buffer covered by this cluster, in `[0, 1]`.
    pub weight: f32,
}

/// Something that can reduce a buffer to its `k` most prominent colors.
///
/// Implementors should return at least one entry for any non-empty buffer, with weights summing to
/// at most one. Order is meaningful - it breaks ties in [`select_dominant`].
pub trait DominantColors {
    fn dominant_colors(&self, buffer: &PixelBuffer, k: NonZeroUsize) -> Vec<WeightedColor>;
}
impl<D: DominantColors + ?Sized> DominantColors for Box<D> {
    fn dominant_colors(&self, buffer: &PixelBuffer, k: NonZeroUsize) -> Vec<WeightedColor> {
        (**self).dominant_colors(buffer, k)
    }
}

/// The heaviest entry, earliest on ties. `None` for no entries.
#[must_use]
pub fn select_dominant(colors: &[WeightedColor]) -> Option<ColorSample> {
    let mut best: Option<&WeightedColor> = None;
    for candidate in colors {
        // Strictly greater, so the first of equal weights stays.
        if best.map_or(true, |best| candidate.weight > best.weight) {
            best = Some(candidate);
        }
    }
    best.map(|best| best.color)
}

pub struct ClusterBased<D> {
    pub collaborator: D,
    pub k: NonZeroUsize,
}
impl<D: DominantColors> ClusterBased<D> {
    pub fn new(collaborator: D, k: NonZeroUsize) -> Self {
        Self { collaborator, k }
    }
    #[must_use]
    pub fn estimate(&self, buffer: &PixelBuffer) -> Option<ColorSample> {
        if buffer.is_empty() {
            return None;
        }
        let colors = self.collaborator.dominant_colors(buffer, self.k);
        for WeightedColor { color, weight } in &colors {
            log::trace!("cluster {color} weight {weight}");
        }
        let chosen = select_dominant(&colors);
        log::debug!("using dominant color {chosen:?}");
        chosen
    }
}

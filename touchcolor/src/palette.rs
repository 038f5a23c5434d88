//! Dominant colors of a whole surface, rather than of the neighborhood of a touch.

use std::num::NonZeroUsize;

use touchcolor_core::estimate::cluster::{DominantColors, WeightedColor};

use crate::capture::{CaptureError, SurfaceCapturer};

/// Capture the visible surface and reduce it to at most `k` colors, heaviest first. Equal weights
/// keep the collaborator's order.
///
/// # Errors
/// If the capture fails, see [`SurfaceCapturer::capture_surface`].
pub async fn palette<D>(
    capturer: &mut SurfaceCapturer,
    collaborator: &D,
    k: NonZeroUsize,
) -> Result<Vec<WeightedColor>, CaptureError>
where
    D: DominantColors + ?Sized,
{
    let buffer = capturer.capture_surface().await?;
    let mut colors = collaborator.dominant_colors(&buffer, k);
    colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    log::debug!("palette of {} colors", colors.len());
    Ok(colors)
}

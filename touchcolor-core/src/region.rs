//! # Region clamping
//!
//! Turns a touch point into the rectangle of pixels worth capturing around it.

use crate::geom::{Extent, Point, Rect};

/// What happens to the far edge of the neighborhood when it would grow past the surface.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ClampPolicy {
    /// The far edge collapses onto the touch coordinate itself. Touches near the right or bottom
    /// edge therefore only capture the neighborhood on the near side.
    #[default]
    CollapseToTouch,
    /// The far edge stops at the surface edge.
    SurfaceEdge,
}

/// One axis of [`compute_region`], in `i64` so no combination of inputs can overflow.
fn clamp_axis(touch: i32, radius: u32, length: u32, policy: ClampPolicy) -> (u32, u32) {
    let touch = i64::from(touch);
    let radius = i64::from(radius);
    let length = i64::from(length);

    let near = (touch - radius).max(0);
    let far = touch + radius;
    let far = if far < length {
        far
    } else {
        match policy {
            ClampPolicy::CollapseToTouch => touch,
            ClampPolicy::SurfaceEdge => length,
        }
    };

    // Everything is now forced into [0, length], with near <= far.
    let far = far.clamp(0, length);
    let near = near.min(far);
    // Casts OK - both clamped to [0, length] where length came from a u32.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    (near as u32, far as u32)
}

/// Compute the capture rectangle of `radius` around `touch`, clamped into `extent`.
///
/// `touch` must already be in the same coordinate space as `extent`. The result is always
/// contained in `extent`, and may be zero-area when the touch sits at or beyond an edge.
#[must_use]
pub fn compute_region(touch: Point, extent: Extent, radius: u32, policy: ClampPolicy) -> Rect {
    let (left, right) = clamp_axis(touch.x, radius, extent.width(), policy);
    let (top, bottom) = clamp_axis(touch.y, radius, extent.height(), policy);
    Rect::from_corners((left, top), (right, bottom))
}

/// Widen a zero-area region to the single pixel under `touch`, so that a capture always has
/// something to read. Non-empty regions are returned unchanged.
#[must_use]
pub fn sampleable_region(region: Rect, touch: Point, extent: Extent) -> Rect {
    if region.is_empty() {
        Rect::pixel_at(touch, extent)
    } else {
        region
    }
}

#[cfg(test)]
mod test {
    use super::{compute_region, sampleable_region, ClampPolicy};
    use crate::geom::{Extent, Point, Rect};

    #[test]
    fn interior_touch() {
        let extent = Extent::new(200, 200).unwrap();
        for policy in <ClampPolicy as strum::IntoEnumIterator>::iter() {
            let r = compute_region(Point::new(100, 50), extent, 30, policy);
            assert_eq!(r, Rect::from_corners((70, 20), (130, 80)), "{policy}");
        }
    }
    #[test]
    fn legacy_collapse_to_touch() {
        let extent = Extent::new(100, 100).unwrap();
        let r = compute_region(Point::new(95, 5), extent, 10, ClampPolicy::CollapseToTouch);
        assert_eq!(r, Rect::from_corners((85, 0), (95, 15)));
        // Exactly reaching the edge collapses too.
        let r = compute_region(Point::new(90, 50), extent, 10, ClampPolicy::CollapseToTouch);
        assert_eq!(r.right(), 90);
    }
    #[test]
    fn surface_edge() {
        let extent = Extent::new(100, 100).unwrap();
        let r = compute_region(Point::new(95, 95), extent, 10, ClampPolicy::SurfaceEdge);
        assert_eq!(r, Rect::from_corners((85, 85), (100, 100)));
    }
    #[test]
    fn corner_with_huge_radius_is_minimal() {
        let extent = Extent::new(10, 10).unwrap();
        let r = compute_region(Point::ORIGIN, extent, 100, ClampPolicy::CollapseToTouch);
        assert_eq!(r, Rect::from_corners((0, 0), (0, 0)));
        assert!(r.is_empty());
        assert_eq!(
            sampleable_region(r, Point::ORIGIN, extent),
            Rect::from_corners((0, 0), (1, 1))
        );
    }
    #[test]
    fn always_contained() {
        let extent = Extent::new(37, 23).unwrap();
        let coords = [i32::MIN, -500, -1, 0, 1, 11, 22, 23, 36, 37, 38, 1000, i32::MAX];
        for policy in <ClampPolicy as strum::IntoEnumIterator>::iter() {
            for radius in [0, 1, 5, 30, 100, u32::MAX] {
                for &x in &coords {
                    for &y in &coords {
                        let r = compute_region(Point::new(x, y), extent, radius, policy);
                        assert!(r.is_within(extent), "{r} escaped for ({x}, {y}) r={radius}");
                        let r = sampleable_region(r, Point::new(x, y), extent);
                        assert!(!r.is_empty() && r.is_within(extent));
                    }
                }
            }
        }
    }
}

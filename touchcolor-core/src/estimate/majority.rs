//! # Majority-vote estimation
//!
//! Samples a coarse square lattice around the touch point and takes the Boyer-Moore majority
//! candidate of each channel independently.

use smallvec::SmallVec;

use crate::{buffer::PixelBuffer, color::ColorSample, geom::Point};

/// How the lattice walk treats a sample point that falls outside the buffer.
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
pub enum BoundaryPolicy {
    /// Ignore the point and keep walking.
    #[default]
    Skip,
    /// End the walk at the first out-of-bounds point. Near an edge this throws away every
    /// in-bounds point that comes later in lattice order.
    StopAtFirst,
}

/// Lattice points for the default step of 2 fit inline.
pub type Lattice = SmallVec<[Point; 25]>;

/// Points `center + radius * (xi, yi)` for `xi`, `yi` in `-step..=step`, `xi` in the outer loop.
///
/// Duplicates (only possible with a zero radius) are dropped, keeping the first occurrence, so the
/// order is fully determined by the inputs.
#[must_use]
pub fn sample_lattice(center: Point, radius: u32, step: u32) -> Lattice {
    use az::SaturatingAs;
    let radius: i32 = radius.saturating_as();
    let step: i32 = step.saturating_as();

    let side = (2 * i64::from(step) + 1).saturating_as::<usize>();
    let mut seen = hashbrown::HashSet::with_capacity(side.saturating_mul(side).min(4096));
    let mut lattice = Lattice::new();
    for xi in -step..=step {
        for yi in -step..=step {
            let point = Point {
                x: center.x.saturating_add(radius.saturating_mul(xi)),
                y: center.y.saturating_add(radius.saturating_mul(yi)),
            };
            if seen.insert(point) {
                lattice.push(point);
            }
        }
    }
    lattice
}

/// Boyer-Moore majority vote.
///
/// Returns the final candidate of a single pass. This is *not* verified to be a true (> n/2)
/// majority - with no majority present, some element of the input is still returned, always the
/// same one for the same input order. `None` only for empty input.
pub fn majority_element<T, I>(items: I) -> Option<T>
where
    T: Copy + Eq,
    I: IntoIterator<Item = T>,
{
    let mut candidate = None;
    let mut count = 0usize;
    for item in items {
        if count == 0 {
            candidate = Some(item);
        }
        if candidate == Some(item) {
            count += 1;
        } else {
            count -= 1;
        }
    }
    candidate
}

/// Per-channel sample sequences, in lattice encounter order.
#[derive(Default, Debug)]
struct Channels {
    red: SmallVec<[u8; 25]>,
    green: SmallVec<[u8; 25]>,
    blue: SmallVec<[u8; 25]>,
}
impl Channels {
    fn push(&mut self, color: ColorSample) {
        self.red.push(color.r);
        self.green.push(color.g);
        self.blue.push(color.b);
    }
    fn len(&self) -> usize {
        self.red.len()
    }
    fn majority(&self) -> Option<ColorSample> {
        Some(ColorSample {
            r: majority_element(self.red.iter().copied())?,
            g: majority_element(self.green.iter().copied())?,
            b: majority_element(self.blue.iter().copied())?,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MajorityVote {
    /// Distance between neighboring lattice points.
    pub sample_radius: u32,
    /// Lattice points on each side of the center, per axis.
    pub sample_step: u32,
    pub boundary: BoundaryPolicy,
}
impl Default for MajorityVote {
    fn default() -> Self {
        Self {
            sample_radius: 30,
            sample_step: 2,
            boundary: BoundaryPolicy::default(),
        }
    }
}
impl MajorityVote {
    /// Collect the in-bounds lattice samples, in walk order.
    fn walk(&self, buffer: &PixelBuffer, center: Point) -> Channels {
        let mut channels = Channels::default();
        for point in sample_lattice(center, self.sample_radius, self.sample_step) {
            match buffer.get(point) {
                Some(color) => channels.push(color),
                None => match self.boundary {
                    BoundaryPolicy::Skip => continue,
                    BoundaryPolicy::StopAtFirst => break,
                },
            }
        }
        channels
    }
    /// Estimate the color around `center`, in the buffer's own coordinates.
    ///
    /// Falls back to the single pixel at `center` if no lattice point could be sampled, which in
    /// turn is `None` only if `center` itself is outside the buffer.
    #[must_use]
    pub fn estimate(&self, buffer: &PixelBuffer, center: Point) -> Option<ColorSample> {
        let channels = self.walk(buffer, center);
        log::trace!("majority vote over {} samples", channels.len());

        if let Some(color) = channels.majority() {
            log::debug!("using majority color {color}");
            Some(color)
        } else {
            let color = buffer.get(center);
            log::debug!("no lattice samples in bounds, using center pixel {color:?}");
            color
        }
    }
}

#[cfg(test)]
mod test {
    use super::{majority_element, sample_lattice, BoundaryPolicy, MajorityVote};
    use crate::{ColorSample, Extent, PixelBuffer, Point};

    #[test]
    fn majority_basics() {
        assert_eq!(majority_element(std::iter::empty::<i32>()), None);
        assert_eq!(majority_element([5]), Some(5));
        assert_eq!(majority_element([1, 1, 1, 2, 2]), Some(1));
        assert_eq!(majority_element([2, 1, 1, 2, 1]), Some(1));
    }
    #[test]
    fn majority_without_majority_is_deterministic() {
        let input = [1, 2, 3];
        let first = majority_element(input).unwrap();
        assert!(input.contains(&first));
        assert_eq!(majority_element(input), Some(first));
        // Boyer-Moore's actual answer for this order.
        assert_eq!(first, 3);
    }
    #[test]
    fn lattice_shape() {
        let lattice = sample_lattice(Point::new(100, 100), 30, 2);
        assert_eq!(lattice.len(), 25);
        assert_eq!(lattice[0], Point::new(40, 40));
        assert_eq!(lattice[1], Point::new(40, 70));
        assert_eq!(lattice[12], Point::new(100, 100));
        assert_eq!(lattice[24], Point::new(160, 160));
    }
    #[test]
    fn zero_radius_lattice_dedups() {
        let lattice = sample_lattice(Point::new(3, 4), 0, 2);
        assert_eq!(lattice.as_slice(), &[Point::new(3, 4)]);
        assert_eq!(sample_lattice(Point::ORIGIN, 7, 0).len(), 1);
    }
    #[test]
    fn uniform_buffer_round_trips() {
        let color = ColorSample::new(12, 200, 7);
        let buffer = PixelBuffer::filled(Extent::new(64, 40).unwrap(), color);
        for sample_radius in [0, 1, 10, 30] {
            for sample_step in [0, 1, 2, 3] {
                let estimator = MajorityVote {
                    sample_radius,
                    sample_step,
                    boundary: BoundaryPolicy::Skip,
                };
                assert_eq!(estimator.estimate(&buffer, Point::new(20, 20)), Some(color));
            }
        }
    }
    #[test]
    fn red_scenario() {
        let red = ColorSample::new(255, 0, 0);
        let buffer = PixelBuffer::filled(Extent::new(50, 50).unwrap(), red);
        let estimator = MajorityVote {
            sample_radius: 10,
            sample_step: 1,
            boundary: BoundaryPolicy::default(),
        };
        assert_eq!(estimator.estimate(&buffer, Point::new(25, 25)), Some(red));
    }
    #[test]
    fn lattice_outside_falls_back_to_center() {
        // 1x1 buffer, every non-center lattice point is out of bounds.
        let mut image = image::RgbaImage::new(1, 1);
        image.put_pixel(0, 0, image::Rgba([9, 8, 7, 255]));
        let buffer = PixelBuffer::from_image(image);
        for boundary in <BoundaryPolicy as strum::IntoEnumIterator>::iter() {
            let estimator = MajorityVote {
                sample_radius: 100,
                sample_step: 1,
                boundary,
            };
            assert_eq!(
                estimator.estimate(&buffer, Point::ORIGIN),
                Some(ColorSample::new(9, 8, 7))
            );
        }
    }
    #[test]
    fn empty_buffer_yields_nothing() {
        let buffer = PixelBuffer::from_image(image::RgbaImage::new(0, 0));
        assert_eq!(MajorityVote::default().estimate(&buffer, Point::ORIGIN), None);
    }
    #[test]
    fn boundary_policies_differ_near_edge() {
        // Black for x < 15, white beyond.
        let image = image::RgbaImage::from_fn(40, 40, |x, _| {
            if x < 15 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let buffer = PixelBuffer::from_image(image);
        let skip = MajorityVote {
            sample_radius: 10,
            sample_step: 1,
            boundary: BoundaryPolicy::Skip,
        };
        let stop = MajorityVote {
            boundary: BoundaryPolicy::StopAtFirst,
            ..skip
        };
        // Walk order is column x=10 (black), then x=20 and x=30 (white), each over y=25,35,45.
        // y=45 is out of bounds, so StopAtFirst never leaves the black column.
        let center = Point::new(20, 35);
        assert_eq!(skip.walk(&buffer, center).len(), 6);
        assert_eq!(stop.walk(&buffer, center).len(), 2);
        assert_eq!(skip.estimate(&buffer, center), Some(ColorSample::WHITE));
        assert_eq!(stop.estimate(&buffer, center), Some(ColorSample::BLACK));
    }
    #[test]
    fn stop_at_first_can_sample_nothing() {
        // Black everywhere but the center pixel.
        let mut image = image::RgbaImage::from_pixel(40, 40, image::Rgba([0, 0, 0, 255]));
        image.put_pixel(5, 5, image::Rgba([255, 255, 255, 255]));
        let buffer = PixelBuffer::from_image(image);
        let skip = MajorityVote {
            sample_radius: 10,
            sample_step: 1,
            boundary: BoundaryPolicy::Skip,
        };
        let stop = MajorityVote {
            boundary: BoundaryPolicy::StopAtFirst,
            ..skip
        };
        let center = Point::new(5, 5);
        // The first lattice point, (-5, -5), is already out.
        assert_eq!(stop.walk(&buffer, center).len(), 0);
        assert_eq!(stop.estimate(&buffer, center), Some(ColorSample::WHITE));
        // Skip finds the center and three black neighbors.
        assert_eq!(skip.walk(&buffer, center).len(), 4);
        assert_eq!(skip.estimate(&buffer, center), Some(ColorSample::BLACK));
    }
}

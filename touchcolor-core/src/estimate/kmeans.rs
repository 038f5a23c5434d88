//! Default [`DominantColors`] collaborator: plain k-means over a downscaled copy of the buffer.

use std::num::NonZeroUsize;

use super::cluster::{DominantColors, WeightedColor};
use crate::{buffer::PixelBuffer, color::ColorSample};

/// Perceptual channel weights for the distance metric.
const CHANNEL_WEIGHTS: [f64; 3] = [0.30, 0.59, 0.11];

/// Weighted squared distance between two colors.
fn distance_sq(a: ColorSample, b: ColorSample) -> f64 {
    a.as_array()
        .into_iter()
        .zip(b.as_array())
        .zip(CHANNEL_WEIGHTS)
        .map(|((a, b), weight)| {
            let delta = (f64::from(a) - f64::from(b)) * weight;
            delta * delta
        })
        .sum()
}

fn nearest(centroids: &[ColorSample], color: ColorSample) -> usize {
    let mut best = (0, f64::MAX);
    for (idx, &centroid) in centroids.iter().enumerate() {
        let dist = distance_sq(color, centroid);
        if dist < best.1 {
            best = (idx, dist);
        }
    }
    best.0
}

/// Shrink to fit within a `side` square, keeping aspect. Smaller images are copied as-is.
fn fit_in_square(image: &image::RgbaImage, side: u32) -> image::RgbaImage {
    let (width, height) = image.dimensions();
    if width <= side && height <= side {
        return image.clone();
    }
    let scaled = |long: u32, short: u32| -> u32 {
        // Fits, `short < long` and result is <= side.
        #[allow(clippy::cast_possible_truncation)]
        let v = (u64::from(side) * u64::from(short) / u64::from(long)) as u32;
        v.max(1)
    };
    let (new_width, new_height) = if width > height {
        (side, scaled(width, height))
    } else {
        (scaled(height, width), side)
    };
    image::imageops::resize(
        image,
        new_width,
        new_height,
        image::imageops::FilterType::Nearest,
    )
}

/// Pick `k` starting centroids from evenly spaced pixels, nudging forward past colors that were
/// already picked. Duplicates are only accepted once the image has no other colors to offer.
fn seed(pixels: &[ColorSample], k: usize) -> Vec<ColorSample> {
    let mut centroids = Vec::with_capacity(k);
    for i in 0..k {
        let start = i * pixels.len() / k;
        let fresh = (0..pixels.len())
            .map(|offset| pixels[(start + offset) % pixels.len()])
            .find(|color| !centroids.contains(color));
        centroids.push(fresh.unwrap_or(pixels[start]));
    }
    centroids
}

#[derive(Clone, Debug)]
pub struct KMeans {
    /// Buffers are downscaled to fit in a square of this size before clustering.
    pub side: u32,
    pub max_iterations: usize,
    /// Stop once no centroid moves further than this (in [`distance_sq`] units).
    pub convergence: f64,
}
impl Default for KMeans {
    fn default() -> Self {
        Self {
            side: 50,
            max_iterations: 100,
            convergence: 1.0,
        }
    }
}
impl DominantColors for KMeans {
    fn dominant_colors(&self, buffer: &PixelBuffer, k: NonZeroUsize) -> Vec<WeightedColor> {
        if buffer.is_empty() {
            return Vec::new();
        }
        let small = fit_in_square(buffer.as_image(), self.side.max(1));
        let pixels: Vec<ColorSample> = small.pixels().copied().map(Into::into).collect();
        // More clusters than pixels can only ever be empty.
        let k = k.get().min(pixels.len());

        let mut centroids = seed(&pixels, k);
        let mut members = vec![0usize; k];
        let mut sums = vec![[0u64; 3]; k];
        for iteration in 0..self.max_iterations {
            members.fill(0);
            sums.fill([0; 3]);
            for &pixel in &pixels {
                let best = nearest(&centroids, pixel);
                members[best] += 1;
                for (sum, channel) in sums[best].iter_mut().zip(pixel.as_array()) {
                    *sum += u64::from(channel);
                }
            }

            let mut max_error = 0.0f64;
            for ((centroid, &count), sum) in centroids.iter_mut().zip(&members).zip(&sums) {
                let moved = if count == 0 {
                    ColorSample::WHITE
                } else {
                    let count = count as u64;
                    // Mean of u8s always fits.
                    #[allow(clippy::cast_possible_truncation)]
                    let mean = |sum: u64| (sum / count) as u8;
                    ColorSample::new(mean(sum[0]), mean(sum[1]), mean(sum[2]))
                };
                max_error = max_error.max(distance_sq(moved, *centroid));
                *centroid = moved;
            }
            if max_error <= self.convergence {
                log::trace!("k-means converged after {} iterations", iteration + 1);
                break;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let total = pixels.len() as f32;
        centroids
            .into_iter()
            .zip(members)
            .map(|(color, count)| {
                #[allow(clippy::cast_precision_loss)]
                let weight = count as f32 / total;
                WeightedColor { color, weight }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::{distance_sq, fit_in_square, KMeans};
    use crate::estimate::cluster::{select_dominant, DominantColors};
    use crate::{ColorSample, Extent, PixelBuffer};
    use std::num::NonZeroUsize;

    #[test]
    fn distance_weights() {
        let black = ColorSample::BLACK;
        assert!((distance_sq(black, ColorSample::new(10, 0, 0)) - 9.0).abs() < 1e-9);
        assert!(distance_sq(black, ColorSample::new(0, 10, 0)) > distance_sq(black, ColorSample::new(10, 0, 0)));
        assert!(distance_sq(black, black) == 0.0);
    }
    #[test]
    fn downscale_keeps_aspect() {
        let wide = image::RgbaImage::new(200, 100);
        assert_eq!(fit_in_square(&wide, 50).dimensions(), (50, 25));
        let tall = image::RgbaImage::new(10, 400);
        assert_eq!(fit_in_square(&tall, 50).dimensions(), (1, 50));
        let small = image::RgbaImage::new(20, 30);
        assert_eq!(fit_in_square(&small, 50).dimensions(), (20, 30));
    }
    #[test]
    fn uniform_image_terminates() {
        let color = ColorSample::new(40, 80, 120);
        let buffer = PixelBuffer::filled(Extent::new(30, 30).unwrap(), color);
        let colors = KMeans::default().dominant_colors(&buffer, NonZeroUsize::new(5).unwrap());
        assert_eq!(colors.len(), 5);
        let weight: f32 = colors.iter().map(|c| c.weight).sum();
        assert!((weight - 1.0).abs() < 1e-6);
        assert_eq!(select_dominant(&colors), Some(color));
    }
    #[test]
    fn majority_color_is_heaviest() {
        // Three quarters blue, one quarter yellow.
        let blue = ColorSample::new(0, 0, 255);
        let yellow = ColorSample::new(255, 255, 0);
        let image = image::RgbaImage::from_fn(80, 80, |x, _| {
            if x < 60 { blue.into() } else { yellow.into() }
        });
        let buffer = PixelBuffer::from_image(image);
        let colors = KMeans::default().dominant_colors(&buffer, NonZeroUsize::new(2).unwrap());
        assert_eq!(select_dominant(&colors), Some(blue));
        let yellow_weight = colors
            .iter()
            .find(|c| c.color == yellow)
            .map(|c| c.weight)
            .unwrap();
        assert!((yellow_weight - 0.25).abs() < 0.05);
    }
    #[test]
    fn empty_buffer_has_no_clusters() {
        let buffer = PixelBuffer::from_image(image::RgbaImage::new(0, 0));
        assert!(KMeans::default()
            .dominant_colors(&buffer, NonZeroUsize::new(3).unwrap())
            .is_empty());
    }
    #[test]
    fn clusters_capped_by_pixels() {
        let buffer = PixelBuffer::filled(Extent::new(2, 2).unwrap(), ColorSample::BLACK);
        let colors = KMeans::default().dominant_colors(&buffer, NonZeroUsize::MAX);
        assert_eq!(colors.len(), 4);
        assert_eq!(select_dominant(&colors), Some(ColorSample::BLACK));
    }
}

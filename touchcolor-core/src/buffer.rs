//! # Pixel buffers
//!
//! A [`PixelBuffer`] is created by exactly one capture and consumed by exactly one estimation.
//! It is deliberately not `Clone` - the pipeline moves it from stage to stage and it is dropped as
//! soon as an estimate has been made.

use crate::{
    color::ColorSample,
    geom::{Extent, Point, Rect},
};

/// An owned RGBA8 grid of pixels with explicit dimensions.
#[derive(Debug)]
pub struct PixelBuffer {
    image: image::RgbaImage,
}
impl PixelBuffer {
    /// A transparent-black buffer of the given size, ready to be drawn into.
    #[must_use]
    pub fn new_blank(extent: Extent) -> Self {
        Self {
            image: image::RgbaImage::new(extent.width(), extent.height()),
        }
    }
    /// A buffer with every pixel set to `color`.
    #[must_use]
    pub fn filled(extent: Extent, color: ColorSample) -> Self {
        Self {
            image: image::RgbaImage::from_pixel(extent.width(), extent.height(), color.into()),
        }
    }
    #[must_use]
    pub fn from_image(image: image::RgbaImage) -> Self {
        Self { image }
    }
    #[must_use]
    pub fn as_image(&self) -> &image::RgbaImage {
        &self.image
    }
    /// Mutable access, for software draws.
    pub fn as_image_mut(&mut self) -> &mut image::RgbaImage {
        &mut self.image
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
    /// `None` if the buffer holds no pixels, eg. the crop of a zero-area rect.
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        Extent::new(self.width(), self.height()).ok()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
    /// Read the pixel at `point`. `None` if it lies outside the buffer.
    #[must_use]
    pub fn get(&self, point: Point) -> Option<ColorSample> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        self.image.get_pixel_checked(x, y).copied().map(Into::into)
    }
    /// Iterate every pixel, row-major.
    pub fn samples(&self) -> impl Iterator<Item = ColorSample> + '_ {
        self.image.pixels().copied().map(Into::into)
    }
    /// Copy out the part of this buffer covered by `rect`. The rect is clipped to the buffer first,
    /// so the result may be smaller than requested - or empty.
    #[must_use]
    pub fn crop(&self, rect: Rect) -> Self {
        let left = rect.left().min(self.width());
        let top = rect.top().min(self.height());
        let right = rect.right().min(self.width());
        let bottom = rect.bottom().min(self.height());
        let view = image::imageops::crop_imm(&self.image, left, top, right - left, bottom - top);
        Self {
            image: view.to_image(),
        }
    }
}

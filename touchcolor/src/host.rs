//! An in-memory host: image-backed surfaces stacked on a virtual screen.
//!
//! Stands in for a real window system, which is all the binary has and all the tests need. Frame
//! delivery and teardown can be controlled, to reproduce a compositor that is slow or goes away.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use parking_lot::RwLock;
use touchcolor_core::{ColorSample, Extent, InvalidDimensions, PixelBuffer, Point, Rect};

use crate::capture::{CaptureError, Compositor, Surface};

struct Content {
    extent: Extent,
    image: image::RgbaImage,
}
impl Content {
    fn new(image: image::RgbaImage) -> Result<Self, InvalidDimensions> {
        Ok(Self {
            extent: Extent::new(image.width(), image.height())?,
            image,
        })
    }
}

/// A surface showing a static image, which may be swapped out or moved at any time.
pub struct ImageSurface {
    content: RwLock<Content>,
    origin: RwLock<Point>,
}
impl ImageSurface {
    /// # Errors
    /// If the image is zero-sized.
    pub fn new(image: image::RgbaImage, origin: Point) -> Result<Self, InvalidDimensions> {
        Ok(Self {
            content: Content::new(image)?.into(),
            origin: origin.into(),
        })
    }
    /// # Errors
    /// If the image is zero-sized, in which case the old content is kept.
    pub fn replace_content(&self, image: image::RgbaImage) -> Result<(), InvalidDimensions> {
        *self.content.write() = Content::new(image)?;
        Ok(())
    }
    pub fn move_to(&self, origin: Point) {
        *self.origin.write() = origin;
    }
}
impl Surface for ImageSurface {
    fn extent(&self) -> Extent {
        self.content.read().extent
    }
    fn origin_on_screen(&self) -> Point {
        *self.origin.read()
    }
    fn draw(&self, target: &mut PixelBuffer) {
        image::imageops::replace(target.as_image_mut(), &self.content.read().image, 0, 0);
    }
}
impl std::fmt::Debug for ImageSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSurface")
            .field("extent", &self.extent())
            .field("origin", &self.origin_on_screen())
            .finish()
    }
}

/// A screen compositing its surfaces, back to front, over a solid background.
pub struct VirtualDisplay {
    extent: Extent,
    background: ColorSample,
    surfaces: RwLock<Vec<Arc<dyn Surface>>>,
    torn_down: AtomicBool,
    /// Whether frames are currently being produced. Read-backs wait for one.
    frames: tokio::sync::watch::Sender<bool>,
    read_backs: AtomicUsize,
}
impl VirtualDisplay {
    #[must_use]
    pub fn new(extent: Extent, background: ColorSample) -> Self {
        let (frames, _) = tokio::sync::watch::channel(true);
        Self {
            extent,
            background,
            surfaces: RwLock::new(Vec::new()),
            torn_down: AtomicBool::new(false),
            frames,
            read_backs: AtomicUsize::new(0),
        }
    }
    /// Place a surface on top of all others.
    pub fn attach(&self, surface: Arc<dyn Surface>) {
        self.surfaces.write().push(surface);
    }
    /// While torn down, every read-back fails.
    pub fn set_torn_down(&self, torn_down: bool) {
        self.torn_down.store(torn_down, Ordering::Release);
    }
    /// Hold read-backs until [`VirtualDisplay::resume_frames`].
    pub fn pause_frames(&self) {
        self.frames.send_replace(false);
    }
    pub fn resume_frames(&self) {
        self.frames.send_replace(true);
    }
    /// How many read-backs have been requested so far, whether or not they succeeded.
    #[must_use]
    pub fn read_back_count(&self) -> usize {
        self.read_backs.load(Ordering::Acquire)
    }
    /// Render the whole screen as it currently looks.
    #[must_use]
    pub fn composite(&self) -> PixelBuffer {
        let mut screen = PixelBuffer::filled(self.extent, self.background);
        for surface in self.surfaces.read().iter() {
            let mut layer = PixelBuffer::new_blank(surface.extent());
            surface.draw(&mut layer);
            let origin = surface.origin_on_screen();
            image::imageops::replace(
                screen.as_image_mut(),
                layer.as_image(),
                origin.x.into(),
                origin.y.into(),
            );
        }
        screen
    }
}
#[async_trait::async_trait]
impl Compositor for VirtualDisplay {
    fn screen_extent(&self) -> Extent {
        self.extent
    }
    async fn read_back(&self, rect: Rect) -> Result<PixelBuffer, CaptureError> {
        self.read_backs.fetch_add(1, Ordering::AcqRel);
        let mut frames = self.frames.subscribe();
        // Sender is owned by self, so this can't close under us. Treat it as a failure anyway.
        let frame = frames.wait_for(|ready| *ready).await.map(|_| ());
        if frame.is_err() || self.torn_down.load(Ordering::Acquire) {
            log::debug!("read-back of {rect} with no frame available");
            return Err(CaptureError::ReadBackFailed);
        }
        if rect.is_empty() || !rect.is_within(self.extent) {
            log::debug!("read-back of {rect} outside of {} screen", self.extent);
            return Err(CaptureError::ReadBackFailed);
        }
        Ok(self.composite().crop(rect))
    }
}
impl std::fmt::Debug for VirtualDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDisplay")
            .field("extent", &self.extent)
            .field("surfaces", &self.surfaces.read().len())
            .field("torn_down", &self.torn_down.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::{ImageSurface, VirtualDisplay};
    use crate::capture::{CaptureError, Compositor, Surface};
    use std::sync::Arc;
    use touchcolor_core::{ColorSample, Extent, Point, Rect};

    fn solid(width: u32, height: u32, color: ColorSample) -> image::RgbaImage {
        image::RgbaImage::from_pixel(width, height, color.into())
    }

    #[test]
    fn rejects_empty_image() {
        assert!(ImageSurface::new(image::RgbaImage::new(0, 4), Point::ORIGIN).is_err());
        let surface = ImageSurface::new(solid(2, 2, ColorSample::WHITE), Point::ORIGIN).unwrap();
        assert!(surface.replace_content(image::RgbaImage::new(3, 0)).is_err());
        assert_eq!(surface.extent(), Extent::new(2, 2).unwrap());
    }
    #[test]
    fn composite_stacks_and_clips() {
        let display = VirtualDisplay::new(Extent::new(10, 10).unwrap(), ColorSample::BLACK);
        let red = ColorSample::new(255, 0, 0);
        let blue = ColorSample::new(0, 0, 255);
        display.attach(Arc::new(
            ImageSurface::new(solid(6, 6, red), Point::new(-2, -2)).unwrap(),
        ));
        display.attach(Arc::new(
            ImageSurface::new(solid(4, 4, blue), Point::new(3, 3)).unwrap(),
        ));
        let screen = display.composite();
        assert_eq!(screen.get(Point::new(0, 0)), Some(red));
        assert_eq!(screen.get(Point::new(3, 3)), Some(blue));
        assert_eq!(screen.get(Point::new(2, 6)), Some(ColorSample::BLACK));
        assert_eq!(screen.get(Point::new(9, 9)), Some(ColorSample::BLACK));
    }
    #[test]
    fn moved_surface_follows() {
        let display = VirtualDisplay::new(Extent::new(10, 10).unwrap(), ColorSample::BLACK);
        let surface = Arc::new(ImageSurface::new(solid(1, 1, ColorSample::WHITE), Point::ORIGIN).unwrap());
        display.attach(surface.clone());
        surface.move_to(Point::new(5, 5));
        let screen = display.composite();
        assert_eq!(screen.get(Point::ORIGIN), Some(ColorSample::BLACK));
        assert_eq!(screen.get(Point::new(5, 5)), Some(ColorSample::WHITE));
    }
    #[tokio::test]
    async fn read_back_validates_rect() {
        let display = VirtualDisplay::new(Extent::new(10, 10).unwrap(), ColorSample::WHITE);
        let inside = display.read_back(Rect::from_corners((8, 8), (10, 10))).await;
        assert_eq!(inside.unwrap().samples().count(), 4);
        let outside = display.read_back(Rect::from_corners((8, 8), (11, 10))).await;
        assert_eq!(outside.unwrap_err(), CaptureError::ReadBackFailed);
        let empty = display.read_back(Rect::from_corners((3, 3), (3, 5))).await;
        assert_eq!(empty.unwrap_err(), CaptureError::ReadBackFailed);
        assert_eq!(display.read_back_count(), 3);
    }
}

//! # Surface capture
//!
//! Reads a rectangle of pixels off a live surface. Hosts expose up to two backends:
//!
//! * [`Compositor`] - fast read-back of the composited screen. Asynchronous and allowed to fail,
//!   eg. when the frame is being torn down. Works in *screen* coordinates.
//! * [`Surface::draw`] - synchronous software draw of the whole surface into an offscreen buffer,
//!   which is then cropped. Never fails, but always pays for a full-surface draw even when only a
//!   small neighborhood is wanted. Works in *view-local* coordinates.
//!
//! Which one is used is a [`CaptureMode`] setting, not something sniffed from the platform, so the
//! pipeline can be driven without a real display.

use std::sync::Arc;

use touchcolor_core::{Extent, PixelBuffer, Point, Rect};

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The composited frame could not supply the region. Transient - the next touch may succeed.
    #[error("composited read-back failed")]
    ReadBackFailed,
    /// The surface went away before the capture completed.
    #[error("surface detached during capture")]
    Detached,
    #[error("composited capture requested, but the host has no compositor")]
    NoCompositor,
}

/// A rendering surface the user is touching.
pub trait Surface: Send + Sync {
    /// Current pixel dimensions.
    fn extent(&self) -> Extent;
    /// Where the surface's top-left sits on screen.
    fn origin_on_screen(&self) -> Point;
    /// Render the current content into `target`, which is [`Surface::extent`] sized.
    fn draw(&self, target: &mut PixelBuffer);
}

/// Screen-level read-back of already composited pixels.
#[async_trait::async_trait]
pub trait Compositor: Send + Sync {
    fn screen_extent(&self) -> Extent;
    /// Copy exactly `rect` (in screen coordinates) out of the current composited frame.
    async fn read_back(&self, rect: Rect) -> Result<PixelBuffer, CaptureError>;
}

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
pub enum CaptureMode {
    /// Fast path, through the host [`Compositor`].
    #[default]
    Composited,
    /// Fallback path, through [`Surface::draw`].
    SoftwareDraw,
}

/// The surface being touched, plus the means to capture it and a liveness flag.
///
/// Clones share the flag - detaching any clone detaches them all.
#[derive(Clone)]
pub struct SurfaceHandle {
    surface: Arc<dyn Surface>,
    compositor: Option<Arc<dyn Compositor>>,
    attached: Arc<tokio::sync::watch::Sender<bool>>,
}
impl SurfaceHandle {
    /// A handle with no compositor, only usable with [`CaptureMode::SoftwareDraw`].
    #[must_use]
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        let (attached, _) = tokio::sync::watch::channel(true);
        Self {
            surface,
            compositor: None,
            attached: Arc::new(attached),
        }
    }
    #[must_use]
    pub fn with_compositor(self, compositor: Arc<dyn Compositor>) -> Self {
        Self {
            compositor: Some(compositor),
            ..self
        }
    }
    #[must_use]
    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }
    /// Mark the surface as gone. Any capture still in flight resolves to
    /// [`CaptureError::Detached`], and later ones fail immediately.
    pub fn detach(&self) {
        if self.attached.send_replace(false) {
            log::debug!("surface detached");
        }
    }
    #[must_use]
    pub fn is_attached(&self) -> bool {
        *self.attached.borrow()
    }
}
impl std::fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("extent", &self.surface.extent())
            .field("has_compositor", &self.compositor.is_some())
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// The coordinate space rects handed to [`SurfaceCapturer::capture`] are measured in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureSpace {
    /// Bounds of the space. Rects must be clamped to this.
    pub extent: Extent,
    /// Where view-local `(0, 0)` lands in this space.
    pub view_origin: Point,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Requested,
    Completed,
    Failed,
}

/// One-shot captures of a single surface. No retries - a failed capture is reported as such.
#[derive(Debug)]
pub struct SurfaceCapturer {
    mode: CaptureMode,
    handle: SurfaceHandle,
    state: CaptureState,
}
impl SurfaceCapturer {
    #[must_use]
    pub fn new(mode: CaptureMode, handle: SurfaceHandle) -> Self {
        Self {
            mode,
            handle,
            state: CaptureState::Idle,
        }
    }
    #[must_use]
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }
    #[must_use]
    pub fn handle(&self) -> &SurfaceHandle {
        &self.handle
    }
    /// State of the most recent capture.
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }
    /// # Errors
    /// [`CaptureError::NoCompositor`] in composited mode without a compositor.
    pub fn capture_space(&self) -> Result<CaptureSpace, CaptureError> {
        match self.mode {
            CaptureMode::Composited => {
                let compositor = self
                    .handle
                    .compositor
                    .as_ref()
                    .ok_or(CaptureError::NoCompositor)?;
                Ok(CaptureSpace {
                    extent: compositor.screen_extent(),
                    view_origin: self.handle.surface.origin_on_screen(),
                })
            }
            CaptureMode::SoftwareDraw => Ok(CaptureSpace {
                extent: self.handle.surface.extent(),
                view_origin: Point::ORIGIN,
            }),
        }
    }
    fn transition(&mut self, state: CaptureState) {
        log::trace!("capture {:?} -> {:?}", self.state, state);
        self.state = state;
    }
    /// Capture `rect`, given in [`SurfaceCapturer::capture_space`] coordinates.
    ///
    /// # Errors
    /// See [`CaptureError`].
    pub async fn capture(&mut self, rect: Rect) -> Result<PixelBuffer, CaptureError> {
        self.transition(CaptureState::Requested);
        let result = match self.mode {
            CaptureMode::Composited => self.read_back(rect).await,
            CaptureMode::SoftwareDraw => self.software_draw(rect),
        };
        self.transition(if result.is_ok() {
            CaptureState::Completed
        } else {
            CaptureState::Failed
        });
        result
    }
    /// Capture everything of the surface that is visible in [`SurfaceCapturer::capture_space`].
    ///
    /// In composited mode, parts of the surface off screen are clipped away, so the buffer may be
    /// smaller than the surface. Software draws always cover the whole surface.
    ///
    /// # Errors
    /// See [`CaptureError`]. A surface entirely off screen fails as
    /// [`CaptureError::ReadBackFailed`].
    pub async fn capture_surface(&mut self) -> Result<PixelBuffer, CaptureError> {
        let space = self.capture_space()?;
        let rect = Rect::placed(space.view_origin, self.handle.surface.extent(), space.extent);
        log::debug!("capturing whole surface as {rect}");
        self.capture(rect).await
    }
    async fn read_back(&self, rect: Rect) -> Result<PixelBuffer, CaptureError> {
        let compositor = self
            .handle
            .compositor
            .as_ref()
            .ok_or(CaptureError::NoCompositor)?;
        let mut attached = self.handle.attached.subscribe();
        // Detach wins any race, dropping the read-back so its result can never land.
        tokio::select! {
            biased;
            _ = attached.wait_for(|attached| !*attached) => Err(CaptureError::Detached),
            result = compositor.read_back(rect) => result,
        }
    }
    fn software_draw(&self, rect: Rect) -> Result<PixelBuffer, CaptureError> {
        if !self.handle.is_attached() {
            return Err(CaptureError::Detached);
        }
        let surface = &self.handle.surface;
        // Always the full surface, even though only `rect` is kept.
        let mut full = PixelBuffer::new_blank(surface.extent());
        surface.draw(&mut full);
        Ok(full.crop(rect))
    }
}

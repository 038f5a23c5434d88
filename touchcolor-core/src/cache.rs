use crate::color::ColorSample;

/// Single-slot memo of the color picked for the current touch session.
///
/// Once set, [`TouchColorCache::get`] keeps answering the same color until
/// [`TouchColorCache::reset`]. There is no interior mutability - whoever owns the session owns
/// the cache, and writes go through `&mut`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchColorCache {
    slot: Option<ColorSample>,
}
impl TouchColorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn get(&self) -> Option<ColorSample> {
        self.slot
    }
    pub fn set(&mut self, color: ColorSample) {
        self.slot = Some(color);
    }
    pub fn reset(&mut self) {
        if let Some(old) = self.slot.take() {
            log::trace!("dropping cached touch color {old}");
        }
    }
}

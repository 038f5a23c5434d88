/// An opaque 8-bit sRGB color, as read straight out of a captured surface.
///
/// Alpha is implicitly full - captured pixels are composited results, and the retouch tool paints
/// opaque color regardless.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexParseError {
    #[error("expected six hex digits")]
    Length,
    #[error("invalid hex digit")]
    Digit,
}

impl ColorSample {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
    /// Pack as `0xAARRGGBB` with full alpha.
    #[must_use]
    pub fn to_argb(self) -> u32 {
        0xFF00_0000 | u32::from(self.r) << 16 | u32::from(self.g) << 8 | u32::from(self.b)
    }
    /// Unpack from `0xAARRGGBB`, discarding alpha.
    #[must_use]
    pub fn from_argb(argb: u32) -> Self {
        let [_, r, g, b] = argb.to_be_bytes();
        Self { r, g, b }
    }
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
    /// Parse `#RRGGBB` or `RRGGBB`.
    ///
    /// # Errors
    /// If the string isn't exactly six hex digits after the optional `#`.
    pub fn from_hex(hex: &str) -> Result<Self, HexParseError> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(HexParseError::Length);
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| HexParseError::Digit)
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
    #[must_use]
    pub fn as_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}
impl From<image::Rgba<u8>> for ColorSample {
    fn from(image::Rgba([r, g, b, _]): image::Rgba<u8>) -> Self {
        Self { r, g, b }
    }
}
impl From<ColorSample> for image::Rgba<u8> {
    fn from(ColorSample { r, g, b }: ColorSample) -> Self {
        image::Rgba([r, g, b, 255])
    }
}
impl std::fmt::Display for ColorSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
impl std::str::FromStr for ColorSample {
    type Err = HexParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
/// Stored as `#RRGGBB` text.
impl serde::Serialize for ColorSample {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
impl<'de> serde::Deserialize<'de> for ColorSample {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

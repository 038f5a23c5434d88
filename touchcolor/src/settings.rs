use std::num::NonZeroUsize;

use touchcolor_core::{
    estimate::{
        kmeans::KMeans,
        majority::{BoundaryPolicy, MajorityVote},
        Estimator, Strategy,
    },
    region::ClampPolicy,
    ColorSample, Extent, InvalidDimensions, Point,
};

use crate::capture::CaptureMode;

const DOCUMENTATION: &str = r##"# Touchcolor settings. You may edit this file, but be aware that formatting and comments will not
# be preserved. Any missing key takes its default.

# capture = "composited" | "software-draw"
# strategy = "cluster-based" | "majority-vote"
# clamp = "collapse-to-touch" | "surface-edge"
# boundary = "skip" | "stop-at-first"
# crop-radius is in pixels around the touch. sample-radius and sample-step only apply to
# majority-vote, clusters only to cluster-based.
# [display] describes the virtual screen used by the command line tool. Its background is a
# "#RRGGBB" color.

"##;

/// Past this, the majority lattice (`(2 * step + 1)^2` points) stops being a neighborhood sample.
pub const MAX_SAMPLE_STEP: u32 = 64;
pub const MAX_CLUSTERS: usize = 256;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

/// Screen geometry for the in-memory host.
#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    /// Where the touched surface sits on screen.
    pub surface_x: i32,
    pub surface_y: i32,
    /// Shown wherever the surface doesn't cover the screen.
    pub background: ColorSample,
}
impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            surface_x: 0,
            surface_y: 0,
            background: ColorSample::BLACK,
        }
    }
}
impl DisplaySettings {
    /// # Errors
    /// If either dimension is zero.
    pub fn extent(&self) -> Result<Extent, InvalidDimensions> {
        Extent::new(self.width, self.height)
    }
    #[must_use]
    pub fn surface_origin(&self) -> Point {
        Point::new(self.surface_x, self.surface_y)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub capture: CaptureMode,
    pub strategy: Strategy,
    pub crop_radius: u32,
    pub clamp: ClampPolicy,
    pub sample_radius: u32,
    pub sample_step: u32,
    pub boundary: BoundaryPolicy,
    pub clusters: NonZeroUsize,
    pub display: DisplaySettings,
}
impl Default for Settings {
    fn default() -> Self {
        let vote = MajorityVote::default();
        Self {
            capture: CaptureMode::default(),
            strategy: Strategy::default(),
            crop_radius: 100,
            clamp: ClampPolicy::default(),
            sample_radius: vote.sample_radius,
            sample_step: vote.sample_step,
            boundary: vote.boundary,
            clusters: NonZeroUsize::MIN.saturating_add(4),
            display: DisplaySettings::default(),
        }
    }
}
impl Settings {
    const FILENAME: &'static str = "touchcolor.toml";
    #[must_use]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let mut dir = preferences_dir()?;
        dir.push(Self::FILENAME);
        Some(dir)
    }
    /// # Errors
    /// If the file can't be read or isn't valid settings.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let string = std::fs::read_to_string(path)?;
        toml::from_str::<Self>(&string)?.validate()
    }
    /// # Errors
    /// If a value is out of its allowed range.
    pub fn validate(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.sample_step <= MAX_SAMPLE_STEP,
            "sample-step {} is above the maximum of {MAX_SAMPLE_STEP}",
            self.sample_step
        );
        anyhow::ensure!(
            self.clusters.get() <= MAX_CLUSTERS,
            "clusters {} is above the maximum of {MAX_CLUSTERS}",
            self.clusters
        );
        Ok(self)
    }
    /// Load from `path`, or from [`Settings::default_path`] if none is given. Any failure is logged
    /// and the defaults are used instead.
    #[must_use]
    pub fn load_or_default(path: Option<&std::path::Path>) -> Self {
        let default_path = Self::default_path();
        let Some(path) = path.or(default_path.as_deref()) else {
            log::warn!("No preferences dir found, using default settings.");
            return Self::default();
        };
        let settings: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings: Self = toml::from_str(&string)?;
            settings.validate()
        };
        match settings {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Settings at {path:?} weren't available, defaulting: {e}");
                Self::default()
            }
        }
    }
    /// Write these settings, with some documentation prefixed, to `path` or to
    /// [`Settings::default_path`].
    ///
    /// # Errors
    /// If there is no preferences dir, or on any write error.
    pub fn save(&self, path: Option<&std::path::Path>) -> anyhow::Result<()> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => {
                let dir =
                    preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
                // Not recursive. If the parent is missing, the user probably has a reason.
                let _ = std::fs::DirBuilder::new().create(&dir);
                dir.join(Self::FILENAME)
            }
        };
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(path, string)?;
        Ok(())
    }
    /// Build the configured estimator. Out of range values are capped, for settings that never
    /// went through [`Settings::validate`].
    #[must_use]
    pub fn estimator(&self) -> Estimator {
        match self.strategy {
            Strategy::MajorityVote => Estimator::MajorityVote(MajorityVote {
                sample_radius: self.sample_radius,
                sample_step: self.sample_step.min(MAX_SAMPLE_STEP),
                boundary: self.boundary,
            }),
            Strategy::ClusterBased => {
                let clusters = NonZeroUsize::new(self.clusters.get().min(MAX_CLUSTERS))
                    .unwrap_or(self.clusters);
                Estimator::cluster_based(KMeans::default(), clusters)
            }
        }
    }
}

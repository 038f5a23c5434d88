//! # Estimators
//!
//! Reduce a captured neighborhood to one representative color. Two strategies exist, picked at
//! configuration time:
//!
//! * [`majority::MajorityVote`] - per-channel Boyer-Moore vote over a coarse sample lattice.
//! * [`cluster::ClusterBased`] - the heaviest cluster from a [`cluster::DominantColors`]
//!   collaborator, by default [`kmeans::KMeans`].

pub mod cluster;
pub mod kmeans;
pub mod majority;

use crate::{buffer::PixelBuffer, color::ColorSample, geom::Point};

/// Which estimator to use. Plain configuration - see [`Estimator`] for the configured thing.
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
pub enum Strategy {
    MajorityVote,
    #[default]
    ClusterBased,
}

/// A configured estimation strategy.
pub enum Estimator {
    MajorityVote(majority::MajorityVote),
    ClusterBased(cluster::ClusterBased<Box<dyn cluster::DominantColors + Send + Sync>>),
}
impl Estimator {
    /// Cluster estimation backed by the given collaborator.
    pub fn cluster_based<D>(collaborator: D, k: std::num::NonZeroUsize) -> Self
    where
        D: cluster::DominantColors + Send + Sync + 'static,
    {
        let collaborator: Box<dyn cluster::DominantColors + Send + Sync> = Box::new(collaborator);
        Self::ClusterBased(cluster::ClusterBased::new(collaborator, k))
    }
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::MajorityVote(_) => Strategy::MajorityVote,
            Self::ClusterBased(_) => Strategy::ClusterBased,
        }
    }
    /// Estimate the color of `buffer` around `center`, given in the buffer's own coordinates.
    /// Cluster estimation considers the whole buffer and ignores `center`.
    ///
    /// Consumes the buffer - no capture outlives its estimate.
    #[must_use]
    pub fn estimate(&self, buffer: PixelBuffer, center: Point) -> Option<ColorSample> {
        match self {
            Self::MajorityVote(vote) => vote.estimate(&buffer, center),
            Self::ClusterBased(cluster) => cluster.estimate(&buffer),
        }
    }
}
impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MajorityVote(vote) => f.debug_tuple("MajorityVote").field(vote).finish(),
            Self::ClusterBased(cluster) => f
                .debug_struct("ClusterBased")
                .field("k", &cluster.k)
                .finish_non_exhaustive(),
        }
    }
}

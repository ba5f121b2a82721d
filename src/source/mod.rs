//! External data collaborators.
//!
//! The scoring core never queries a database or an API itself; it talks to
//! these traits. Two implementations ship with the crate: [`HttpSource`] for
//! the LifeQual JSON API and [`Dataset`] for a static JSON document.

pub mod cache;
pub mod dataset;
pub mod http;

pub use cache::{clear_cache, get_cache_path, CacheConfig, StatsCache};
pub use dataset::Dataset;
pub use http::HttpSource;

use crate::city::types::{AmenityFact, Coordinate, DistrictStat};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmenityKind {
    TransitStop,
    Park,
    Hospital,
    School,
}

impl AmenityKind {
    pub fn label(&self) -> &'static str {
        match self {
            AmenityKind::TransitStop => "transit stop",
            AmenityKind::Park => "park",
            AmenityKind::Hospital => "hospital",
            AmenityKind::School => "school",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// Reported crimes per district
    Crime,
    /// Rent per square meter
    Rent,
}

impl StatKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Crime => "crime",
            StatKind::Rent => "rent",
        }
    }
}

/// A collaborator could not deliver data. Category scoring recovers from
/// every variant with a fallback score.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { status: u16, url: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{0} is not supported by this source")]
    Unsupported(&'static str),

    #[error("no district could be determined for {0}")]
    NoDistrict(Coordinate),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[async_trait]
pub trait AmenitySource: Send + Sync {
    /// Amenities of `kind` within `radius_m` of `origin`. Empty when none.
    async fn find_amenities_near(
        &self,
        origin: Coordinate,
        radius_m: f64,
        kind: AmenityKind,
    ) -> SourceResult<Vec<AmenityFact>>;

    /// Transit stops within `radius_m`. Only their number matters to scoring.
    async fn find_transit_stops_near(
        &self,
        origin: Coordinate,
        radius_m: f64,
    ) -> SourceResult<Vec<AmenityFact>> {
        self.find_amenities_near(origin, radius_m, AmenityKind::TransitStop)
            .await
    }
}

#[async_trait]
pub trait StatisticSource: Send + Sync {
    /// One district's value, `None` when the district has no entry.
    async fn district_statistic(&self, district: &str, kind: StatKind) -> SourceResult<Option<f64>>;

    /// Every district's value, used as the normalization population.
    async fn all_district_statistics(&self, kind: StatKind) -> SourceResult<Vec<DistrictStat>>;
}

#[async_trait]
pub trait DistrictResolver: Send + Sync {
    async fn resolve_district(&self, coordinate: Coordinate) -> SourceResult<String>;
}

/// Everything the scoring pipeline needs from the outside world.
pub trait DataSource: AmenitySource + StatisticSource + DistrictResolver {}

impl<T: AmenitySource + StatisticSource + DistrictResolver> DataSource for T {}

use super::{
    AmenityKind, AmenitySource, DistrictResolver, SourceError, SourceResult, StatKind,
    StatisticSource,
};
use crate::city::geo::distance_m;
use crate::city::types::{AmenityFact, Coordinate, DistrictStat};
use crate::scoring::normalize::find_district;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A district with a representative point, used for nearest-centroid lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictCentroid {
    pub name: String,
    pub centroid: Coordinate,
}

/// Static JSON document holding everything the scorer needs.
///
/// ```json
/// {
///   "districts": [{ "name": "Favoriten", "centroid": { "lat": 48.17, "lng": 16.38 } }],
///   "transport_stops": [{ "name": "Reumannplatz", "coordinate": { "lat": 48.17, "lng": 16.38 } }],
///   "parks": [], "hospitals": [], "schools": [],
///   "crime": [{ "district": "Favoriten", "value": 400 }],
///   "rent": [{ "district": "Favoriten", "value": 11.2 }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub districts: Vec<DistrictCentroid>,
    #[serde(default)]
    pub transport_stops: Vec<AmenityFact>,
    #[serde(default)]
    pub parks: Vec<AmenityFact>,
    #[serde(default)]
    pub hospitals: Vec<AmenityFact>,
    #[serde(default)]
    pub schools: Vec<AmenityFact>,
    #[serde(default)]
    pub crime: Vec<DistrictStat>,
    #[serde(default)]
    pub rent: Vec<DistrictStat>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset at {}", path.display()))?;
        let dataset: Dataset = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse dataset {}", path.display()))?;

        tracing::info!(
            "Loaded dataset: {} districts, {} stops, {} parks, {} hospitals, {} schools",
            dataset.districts.len(),
            dataset.transport_stops.len(),
            dataset.parks.len(),
            dataset.hospitals.len(),
            dataset.schools.len()
        );
        Ok(dataset)
    }

    fn amenities(&self, kind: AmenityKind) -> &[AmenityFact] {
        match kind {
            AmenityKind::TransitStop => &self.transport_stops,
            AmenityKind::Park => &self.parks,
            AmenityKind::Hospital => &self.hospitals,
            AmenityKind::School => &self.schools,
        }
    }

    fn stats(&self, kind: StatKind) -> &[DistrictStat] {
        match kind {
            StatKind::Crime => &self.crime,
            StatKind::Rent => &self.rent,
        }
    }
}

#[async_trait]
impl AmenitySource for Dataset {
    async fn find_amenities_near(
        &self,
        origin: Coordinate,
        radius_m: f64,
        kind: AmenityKind,
    ) -> SourceResult<Vec<AmenityFact>> {
        Ok(self
            .amenities(kind)
            .iter()
            .filter(|a| distance_m(origin, a.coordinate) <= radius_m)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatisticSource for Dataset {
    async fn district_statistic(&self, district: &str, kind: StatKind) -> SourceResult<Option<f64>> {
        Ok(find_district(self.stats(kind), district).map(|s| s.value))
    }

    async fn all_district_statistics(&self, kind: StatKind) -> SourceResult<Vec<DistrictStat>> {
        Ok(self.stats(kind).to_vec())
    }
}

#[async_trait]
impl DistrictResolver for Dataset {
    async fn resolve_district(&self, coordinate: Coordinate) -> SourceResult<String> {
        self.districts
            .iter()
            .map(|d| (d, distance_m(coordinate, d.centroid)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(d, _)| d.name.clone())
            .ok_or(SourceError::NoDistrict(coordinate))
    }
}

//! Per-address category scoring.
//!
//! [`compute_city_data`] fans out the six category computations against a
//! [`DataSource`] and joins them into one [`CityData`]. A failing collaborator
//! only costs its own category, which falls back to a configured score.

pub mod geo;
pub mod types;

use crate::scoring::{
    normalize, score_by_count, score_by_distance, DistanceTable, ScoringConfig, NEUTRAL_SCORE,
};
use crate::source::{AmenityKind, DataSource, SourceResult, StatKind};
use geo::{count_within, nearest};
use types::{CategoryScores, CityData, Coordinate};

pub const PARK_LOOKUP_FAILED: &str = "Park lookup failed";
pub const NO_PARK_NEARBY: &str = "No park nearby";
pub const UNNAMED_PARK: &str = "Unnamed park";

/// Score all six categories for `coordinate` in `district`.
///
/// Never fails: source errors are logged and replaced by the category's
/// fallback score.
pub async fn compute_city_data(
    source: &dyn DataSource,
    coordinate: Coordinate,
    district: &str,
    config: &ScoringConfig,
) -> CityData {
    let fallbacks = config.fallbacks();

    let (transport, (parks, closest_park), health, education, safety, cost_of_living) = tokio::join!(
        async {
            transport_score(source, coordinate, config)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Transport lookup failed, using {}: {}", fallbacks.transport, e);
                    fallbacks.transport
                })
        },
        async {
            park_score(source, coordinate, &config.parks())
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Park lookup failed, using {}: {}", fallbacks.parks, e);
                    (fallbacks.parks, PARK_LOOKUP_FAILED.to_string())
                })
        },
        async {
            nearest_score(source, coordinate, AmenityKind::Hospital, &config.health())
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Hospital lookup failed, using {}: {}", fallbacks.health, e);
                    fallbacks.health
                })
        },
        async {
            nearest_score(source, coordinate, AmenityKind::School, &config.education())
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("School lookup failed, using {}: {}", fallbacks.education, e);
                    fallbacks.education
                })
        },
        async {
            district_stat_score(source, district, StatKind::Crime)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Crime statistics failed, using {}: {}", fallbacks.safety, e);
                    fallbacks.safety
                })
        },
        async {
            district_stat_score(source, district, StatKind::Rent)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        "Rent statistics failed, using {}: {}",
                        fallbacks.cost_of_living,
                        e
                    );
                    fallbacks.cost_of_living
                })
        },
    );

    tracing::debug!(
        "{} ({}): transport={} parks={} health={} education={} safety={} cost_of_living={}",
        coordinate,
        district,
        transport,
        parks,
        health,
        education,
        safety,
        cost_of_living
    );

    CityData {
        coordinate,
        district: district.to_string(),
        scores: CategoryScores {
            transport,
            parks,
            health,
            education,
            safety,
            cost_of_living,
            closest_park,
        },
    }
}

async fn transport_score(
    source: &dyn DataSource,
    coordinate: Coordinate,
    config: &ScoringConfig,
) -> SourceResult<u8> {
    let transport = config.transport();
    let stops = source
        .find_transit_stops_near(coordinate, transport.radius_m)
        .await?;
    // Sources may answer with a looser radius than asked for
    let count = count_within(coordinate, &stops, transport.radius_m);
    Ok(score_by_count(count, transport.points_per_stop))
}

async fn park_score(
    source: &dyn DataSource,
    coordinate: Coordinate,
    table: &DistanceTable,
) -> SourceResult<(u8, String)> {
    let parks = source
        .find_amenities_near(coordinate, table.radius_m, AmenityKind::Park)
        .await?;

    Ok(match nearest(coordinate, &parks) {
        Some((park, distance)) => {
            let name = if park.name.trim().is_empty() {
                UNNAMED_PARK.to_string()
            } else {
                park.name.clone()
            };
            (score_by_distance(distance, &table.buckets, table.floor), name)
        }
        None => (table.floor, NO_PARK_NEARBY.to_string()),
    })
}

async fn nearest_score(
    source: &dyn DataSource,
    coordinate: Coordinate,
    kind: AmenityKind,
    table: &DistanceTable,
) -> SourceResult<u8> {
    let amenities = source
        .find_amenities_near(coordinate, table.radius_m, kind)
        .await?;
    let distance = nearest(coordinate, &amenities)
        .map(|(_, d)| d)
        .unwrap_or(f64::INFINITY);
    Ok(score_by_distance(distance, &table.buckets, table.floor))
}

/// Inverted min-max score of the district's statistic against all districts.
async fn district_stat_score(
    source: &dyn DataSource,
    district: &str,
    kind: StatKind,
) -> SourceResult<u8> {
    let Some(value) = source.district_statistic(district, kind).await? else {
        tracing::debug!("No {} entry for district '{}'", kind.label(), district);
        return Ok(NEUTRAL_SCORE);
    };

    let all: Vec<f64> = source
        .all_district_statistics(kind)
        .await?
        .into_iter()
        .map(|s| s.value)
        .collect();
    Ok(normalize(value, &all, true))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::city::types::{AmenityFact, DistrictStat};
    use crate::scoring::{FallbackScores, TransportConfig};
    use crate::source::{
        AmenitySource, DistrictResolver, SourceError, StatisticSource,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory source. Kinds listed in `failing_*` answer with an error.
    #[derive(Default)]
    pub(crate) struct StubSource {
        pub amenities: HashMap<AmenityKind, Vec<AmenityFact>>,
        pub crime: Vec<DistrictStat>,
        pub rent: Vec<DistrictStat>,
        pub failing_amenities: Vec<AmenityKind>,
        pub failing_stats: Vec<StatKind>,
        pub districts: HashMap<String, String>,
    }

    impl StubSource {
        fn stats(&self, kind: StatKind) -> SourceResult<&[DistrictStat]> {
            if self.failing_stats.contains(&kind) {
                return Err(SourceError::Malformed(format!("{} table", kind.label())));
            }
            Ok(match kind {
                StatKind::Crime => &self.crime,
                StatKind::Rent => &self.rent,
            })
        }
    }

    #[async_trait]
    impl AmenitySource for StubSource {
        async fn find_amenities_near(
            &self,
            _origin: Coordinate,
            _radius_m: f64,
            kind: AmenityKind,
        ) -> SourceResult<Vec<AmenityFact>> {
            if self.failing_amenities.contains(&kind) {
                return Err(SourceError::Status {
                    status: 503,
                    url: format!("stub://{}", kind.label()),
                });
            }
            Ok(self.amenities.get(&kind).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl StatisticSource for StubSource {
        async fn district_statistic(
            &self,
            district: &str,
            kind: StatKind,
        ) -> SourceResult<Option<f64>> {
            Ok(crate::scoring::normalize::find_district(self.stats(kind)?, district)
                .map(|s| s.value))
        }

        async fn all_district_statistics(&self, kind: StatKind) -> SourceResult<Vec<DistrictStat>> {
            Ok(self.stats(kind)?.to_vec())
        }
    }

    #[async_trait]
    impl DistrictResolver for StubSource {
        async fn resolve_district(&self, coordinate: Coordinate) -> SourceResult<String> {
            self.districts
                .get(&coordinate.to_string())
                .cloned()
                .ok_or(SourceError::NoDistrict(coordinate))
        }
    }

    pub(crate) fn origin() -> Coordinate {
        Coordinate::new(48.2082, 16.3738).unwrap()
    }

    /// Point `meters` due north of `origin()`.
    pub(crate) fn north_of_origin(meters: f64) -> Coordinate {
        let dlat = meters / 6_371_000.0_f64 * 180.0 / std::f64::consts::PI;
        Coordinate::new(origin().lat() + dlat, origin().lng()).unwrap()
    }

    fn fact(name: &str, coordinate: Coordinate) -> AmenityFact {
        AmenityFact {
            name: name.to_string(),
            coordinate,
        }
    }

    fn stat(district: &str, value: f64) -> DistrictStat {
        DistrictStat {
            district: district.to_string(),
            value,
        }
    }

    /// Park at 250 m, six stops close by, hospital at 1.5 km, school at 400 m,
    /// Favoriten crime 400 within [100, 500].
    pub(crate) fn vienna_stub() -> StubSource {
        let mut amenities = HashMap::new();
        amenities.insert(
            AmenityKind::Park,
            vec![
                fact("Burggarten", north_of_origin(700.0)),
                fact("Stadtpark", north_of_origin(250.0)),
            ],
        );
        amenities.insert(
            AmenityKind::TransitStop,
            (0..6)
                .map(|i| fact(&format!("Stop {}", i), north_of_origin(50.0 * (i + 1) as f64)))
                .collect(),
        );
        amenities.insert(
            AmenityKind::Hospital,
            vec![fact("AKH", north_of_origin(1500.0))],
        );
        amenities.insert(
            AmenityKind::School,
            vec![fact("VS Reumannplatz", north_of_origin(400.0))],
        );

        StubSource {
            amenities,
            crime: vec![
                stat("Innere Stadt", 100.0),
                stat("Favoriten", 400.0),
                stat("Simmering", 500.0),
            ],
            rent: vec![
                stat("Innere Stadt", 20.0),
                stat("Favoriten", 11.0),
                stat("Simmering", 10.0),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scores_every_category() {
        let source = vienna_stub();
        let data = compute_city_data(&source, origin(), "Favoriten", &ScoringConfig::default()).await;

        assert_eq!(data.district, "Favoriten");
        assert_eq!(data.scores.parks, 80);
        assert_eq!(data.scores.closest_park, "Stadtpark");
        assert_eq!(data.scores.transport, 60);
        assert_eq!(data.scores.health, 70);
        assert_eq!(data.scores.education, 60);
        assert_eq!(data.scores.safety, 25);
        assert_eq!(data.scores.cost_of_living, 90);
    }

    #[tokio::test]
    async fn test_stops_outside_radius_are_not_counted() {
        let mut source = vienna_stub();
        source.amenities.insert(
            AmenityKind::TransitStop,
            vec![
                fact("Near", north_of_origin(100.0)),
                fact("Far", north_of_origin(900.0)),
            ],
        );
        let data = compute_city_data(&source, origin(), "Favoriten", &ScoringConfig::default()).await;
        assert_eq!(data.scores.transport, 10);
    }

    #[tokio::test]
    async fn test_transport_capped_at_100() {
        let mut source = vienna_stub();
        source.amenities.insert(
            AmenityKind::TransitStop,
            (0..15).map(|i| fact("Stop", north_of_origin(i as f64 * 10.0))).collect(),
        );
        let data = compute_city_data(&source, origin(), "Favoriten", &ScoringConfig::default()).await;
        assert_eq!(data.scores.transport, 100);
    }

    #[tokio::test]
    async fn test_nothing_found_uses_floor_scores() {
        let source = StubSource::default();
        let data = compute_city_data(&source, origin(), "Favoriten", &ScoringConfig::default()).await;

        assert_eq!(data.scores.transport, 0);
        assert_eq!(data.scores.parks, 20);
        assert_eq!(data.scores.closest_park, NO_PARK_NEARBY);
        assert_eq!(data.scores.health, 10);
        assert_eq!(data.scores.education, 20);
        // No statistics for the district at all
        assert_eq!(data.scores.safety, 50);
        assert_eq!(data.scores.cost_of_living, 50);
    }

    #[tokio::test]
    async fn test_unnamed_park() {
        let mut source = vienna_stub();
        source
            .amenities
            .insert(AmenityKind::Park, vec![fact("  ", north_of_origin(50.0))]);
        let data = compute_city_data(&source, origin(), "Favoriten", &ScoringConfig::default()).await;
        assert_eq!(data.scores.parks, 100);
        assert_eq!(data.scores.closest_park, UNNAMED_PARK);
    }

    #[tokio::test]
    async fn test_missing_district_is_neutral() {
        let source = vienna_stub();
        let data = compute_city_data(&source, origin(), "Atlantis", &ScoringConfig::default()).await;
        assert_eq!(data.scores.safety, 50);
        assert_eq!(data.scores.cost_of_living, 50);
    }

    #[tokio::test]
    async fn test_failures_use_fallbacks_without_blocking_siblings() {
        let mut source = vienna_stub();
        source.failing_amenities = vec![
            AmenityKind::TransitStop,
            AmenityKind::Park,
            AmenityKind::Hospital,
            AmenityKind::School,
        ];
        source.failing_stats = vec![StatKind::Rent];

        let data = compute_city_data(&source, origin(), "Favoriten", &ScoringConfig::default()).await;

        assert_eq!(data.scores.transport, 50);
        assert_eq!(data.scores.parks, 50);
        assert_eq!(data.scores.closest_park, PARK_LOOKUP_FAILED);
        assert_eq!(data.scores.health, 50);
        assert_eq!(data.scores.education, 50);
        assert_eq!(data.scores.cost_of_living, 50);
        // Crime still answered
        assert_eq!(data.scores.safety, 25);
    }

    #[tokio::test]
    async fn test_school_lookup_failure_is_not_the_empty_floor() {
        let mut failing = vienna_stub();
        failing.failing_amenities = vec![AmenityKind::School];
        let mut empty = vienna_stub();
        empty.amenities.remove(&AmenityKind::School);

        let config = ScoringConfig::default();
        let failed = compute_city_data(&failing, origin(), "Favoriten", &config).await;
        let none_found = compute_city_data(&empty, origin(), "Favoriten", &config).await;

        assert_eq!(failed.scores.education, 50);
        assert_eq!(none_found.scores.education, 20);
    }

    #[tokio::test]
    async fn test_configured_tables_and_fallbacks() {
        let mut source = vienna_stub();
        source.failing_amenities = vec![AmenityKind::School];

        let config = ScoringConfig {
            transport: Some(TransportConfig {
                radius_m: 500.0,
                points_per_stop: 5,
            }),
            fallbacks: Some(FallbackScores {
                education: 33,
                ..Default::default()
            }),
            ..Default::default()
        };

        let data = compute_city_data(&source, origin(), "Favoriten", &config).await;
        assert_eq!(data.scores.transport, 30);
        assert_eq!(data.scores.education, 33);
    }

    #[tokio::test]
    async fn test_idempotent() {
        let source = vienna_stub();
        let config = ScoringConfig::default();
        let first = compute_city_data(&source, origin(), "Favoriten", &config).await;
        let second = compute_city_data(&source, origin(), "Favoriten", &config).await;
        assert_eq!(first, second);
    }
}

use crate::city::compute_city_data;
use crate::city::geo::distance_m;
use crate::city::types::Coordinate;
use crate::scoring::{compute_qol, QolResult, ScoringConfig};
use crate::source::{DataSource, SourceError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not resolve the district of {coordinate}: {source}")]
    DistrictUnresolved {
        coordinate: Coordinate,
        #[source]
        source: SourceError,
    },
}

/// One address to score. Without `district` the source is asked to resolve it.
#[derive(Debug, Clone)]
pub struct AddressQuery {
    pub coordinate: Coordinate,
    pub district: Option<String>,
    pub persona: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressReport {
    pub coordinate: Coordinate,
    pub district: String,
    pub persona: String,
    #[serde(flatten)]
    pub result: QolResult,
}

/// Result of one side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddressOutcome {
    Scored(AddressReport),
    Failed { coordinate: Coordinate, error: String },
}

impl AddressOutcome {
    pub fn report(&self) -> Option<&AddressReport> {
        match self {
            AddressOutcome::Scored(report) => Some(report),
            AddressOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub first: AddressOutcome,
    pub second: AddressOutcome,
    /// |total1 - total2|, only when both addresses were scored
    pub delta: Option<u8>,
    pub linear_distance_m: f64,
}

/// Resolve the district, score the six categories and weight them.
pub async fn score_address(
    source: &dyn DataSource,
    query: &AddressQuery,
    config: &ScoringConfig,
) -> Result<AddressReport, PipelineError> {
    let district = match &query.district {
        Some(d) => d.clone(),
        None => source
            .resolve_district(query.coordinate)
            .await
            .map_err(|source| PipelineError::DistrictUnresolved {
                coordinate: query.coordinate,
                source,
            })?,
    };
    tracing::info!("Scoring {} in {} for '{}'", query.coordinate, district, query.persona);

    let data = compute_city_data(source, query.coordinate, &district, config).await;
    let weights = config.resolve_weights(&query.persona);
    let result = compute_qol(&data, &weights);

    Ok(AddressReport {
        coordinate: query.coordinate,
        district,
        persona: query.persona.clone(),
        result,
    })
}

/// Score two addresses concurrently. One failing side does not stop the other.
pub async fn compare(
    source: &dyn DataSource,
    first: &AddressQuery,
    second: &AddressQuery,
    config: &ScoringConfig,
) -> ComparisonResult {
    let (a, b) = futures::future::join(
        score_address(source, first, config),
        score_address(source, second, config),
    )
    .await;

    let first_outcome = outcome(first.coordinate, a);
    let second_outcome = outcome(second.coordinate, b);

    let delta = match (first_outcome.report(), second_outcome.report()) {
        (Some(x), Some(y)) => Some(x.result.total_score.abs_diff(y.result.total_score)),
        _ => None,
    };

    ComparisonResult {
        first: first_outcome,
        second: second_outcome,
        delta,
        linear_distance_m: distance_m(first.coordinate, second.coordinate),
    }
}

fn outcome(coordinate: Coordinate, result: Result<AddressReport, PipelineError>) -> AddressOutcome {
    match result {
        Ok(report) => AddressOutcome::Scored(report),
        Err(e) => {
            tracing::warn!("{}", e);
            AddressOutcome::Failed {
                coordinate,
                error: e.to_string(),
            }
        }
    }
}

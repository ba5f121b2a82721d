use super::cache::StatsCache;
use super::{
    AmenityKind, AmenitySource, DistrictResolver, SourceError, SourceResult, StatKind,
    StatisticSource,
};
use crate::city::types::{AmenityFact, Coordinate, DistrictStat};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

/// Client for the LifeQual JSON API (`/api/parks`, `/api/crime-stats/...`).
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
    cache: StatsCache,
}

impl AmenityKind {
    fn endpoint(&self) -> &'static str {
        match self {
            AmenityKind::TransitStop => "transport-stops",
            AmenityKind::Park => "parks",
            AmenityKind::Hospital => "hospitals",
            AmenityKind::School => "schools",
        }
    }
}

impl StatKind {
    fn endpoint(&self) -> &'static str {
        match self {
            StatKind::Crime => "crime-stats",
            StatKind::Rent => "rent-prices",
        }
    }

    /// Column carrying the value in API rows
    fn value_field(&self) -> &'static str {
        match self {
            StatKind::Crime => "crimes",
            StatKind::Rent => "price_per_sqm",
        }
    }
}

/// Point as the API serializes it: `{"x": lng, "y": lat}` or `"(lng, lat)"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Xy { x: f64, y: f64 },
    Text(String),
}

impl RawPoint {
    fn to_coordinate(&self) -> Option<Coordinate> {
        match self {
            RawPoint::Xy { x, y } => Coordinate::new(*y, *x).ok(),
            RawPoint::Text(text) => {
                let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;
                let (lng, lat) = inner.split_once(',')?;
                Coordinate::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?).ok()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAmenity {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    coordinates: Option<RawPoint>,
}

/// Numeric column that Postgres DECIMALs turn into strings ("12.50").
fn number_field(row: &Value, field: &str) -> Option<f64> {
    match row.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration, cache: StatsCache) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL '{}': not a base URL", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lifequal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            cache,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json(&self, url: Url) -> SourceResult<Option<Value>> {
        // Retry transport failures only: 10ms, 100ms, 1s
        let retry_strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_secs(2))
            .take(3);

        let response = Retry::spawn(retry_strategy, || self.client.get(url.clone()).send()).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Malformed(format!("{}: {}", url, e)))?;
        Ok(Some(body))
    }

    async fn fetch_all_stats(&self, kind: StatKind) -> SourceResult<Vec<DistrictStat>> {
        let url = self.url(&[kind.endpoint()]);
        let body = self.get_json(url.clone()).await?.unwrap_or(Value::Null);
        let Value::Array(rows) = body else {
            return Err(SourceError::Malformed(format!("{}: expected an array", url)));
        };

        let stats: Vec<DistrictStat> = rows
            .iter()
            .filter_map(|row| {
                let district = row.get("district")?.as_str()?.to_string();
                let value = number_field(row, kind.value_field())?;
                Some(DistrictStat { district, value })
            })
            .collect();

        if stats.len() < rows.len() {
            tracing::debug!(
                "Skipped {} unusable {} rows",
                rows.len() - stats.len(),
                kind.label()
            );
        }
        Ok(stats)
    }
}

#[async_trait]
impl AmenitySource for HttpSource {
    async fn find_amenities_near(
        &self,
        origin: Coordinate,
        radius_m: f64,
        kind: AmenityKind,
    ) -> SourceResult<Vec<AmenityFact>> {
        let mut url = self.url(&[kind.endpoint()]);
        url.query_pairs_mut()
            .append_pair("lat", &origin.lat().to_string())
            .append_pair("lng", &origin.lng().to_string())
            .append_pair("radius", &radius_m.to_string());

        let body = self.get_json(url.clone()).await?.unwrap_or(Value::Null);
        let Value::Array(rows) = body else {
            return Err(SourceError::Malformed(format!("{}: expected an array", url)));
        };

        // Rows without usable coordinates are skipped, not fatal
        let amenities: Vec<AmenityFact> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value::<RawAmenity>(row).ok())
            .filter_map(|raw| {
                let coordinate = raw.coordinates.as_ref()?.to_coordinate()?;
                Some(AmenityFact {
                    name: raw.name.unwrap_or_default(),
                    coordinate,
                })
            })
            .collect();

        tracing::debug!(
            "{} {}s within {} m of {}",
            amenities.len(),
            kind.label(),
            radius_m,
            origin
        );
        Ok(amenities)
    }
}

#[async_trait]
impl StatisticSource for HttpSource {
    async fn district_statistic(&self, district: &str, kind: StatKind) -> SourceResult<Option<f64>> {
        let url = self.url(&[kind.endpoint(), district.trim()]);
        let Some(body) = self.get_json(url.clone()).await? else {
            return Ok(None);
        };

        // Unknown districts come back as {"error": "District not found"}
        if body.get("error").is_some() {
            return Ok(None);
        }

        number_field(&body, kind.value_field())
            .map(Some)
            .ok_or_else(|| {
                SourceError::Malformed(format!("{}: missing '{}'", url, kind.value_field()))
            })
    }

    async fn all_district_statistics(&self, kind: StatKind) -> SourceResult<Vec<DistrictStat>> {
        if let Some(cached) = self.cache.read(kind).await {
            tracing::debug!("Using cached {} table ({} districts)", kind.label(), cached.len());
            return Ok(cached);
        }

        let stats = self.fetch_all_stats(kind).await?;
        if let Err(e) = self.cache.write(kind, &stats).await {
            tracing::debug!("Ignoring cache write failure: {:#}", e);
        }
        Ok(stats)
    }
}

#[async_trait]
impl DistrictResolver for HttpSource {
    async fn resolve_district(&self, _coordinate: Coordinate) -> SourceResult<String> {
        Err(SourceError::Unsupported("reverse geocoding"))
    }
}

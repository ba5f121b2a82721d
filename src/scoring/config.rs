use super::distance::{education_buckets, health_buckets, park_buckets, DistanceBucket};
use super::persona::{Persona, WeightVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main scoring configuration.
///
/// Every field is optional; missing parts fall back to the built-in policy.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   transport: { radius_m: 500, points_per_stop: 10 }
///   parks:
///     radius_m: 2000
///     floor: 20
///     buckets:
///       - { below_m: 100, score: 100 }
///       - { below_m: 300, score: 80 }
///   fallbacks: { education: 40 }
///   personas:
///     commuter: { transport: 0.4, parks: 0.1, health: 0.1, education: 0.1, safety: 0.1, cost_of_living: 0.2 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Stop-count scoring for public transport
    #[serde(default)]
    pub transport: Option<TransportConfig>,

    /// Distance table for the nearest park
    #[serde(default)]
    pub parks: Option<DistanceTable>,

    /// Distance table for the nearest hospital
    #[serde(default)]
    pub health: Option<DistanceTable>,

    /// Distance table for the nearest school
    #[serde(default)]
    pub education: Option<DistanceTable>,

    /// Scores substituted when a category's data source fails
    #[serde(default)]
    pub fallbacks: Option<FallbackScores>,

    /// Extra personas, or overrides of built-in ones
    #[serde(default)]
    pub personas: Option<BTreeMap<String, WeightVector>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Stops farther away than this are not counted
    pub radius_m: f64,
    /// Points per stop in range, total capped at 100
    pub points_per_stop: u8,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            radius_m: 500.0,
            points_per_stop: 10,
        }
    }
}

/// Step table mapping distance to the nearest amenity onto a score.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DistanceTable {
    /// Search radius passed to the amenity source
    pub radius_m: f64,
    /// Sorted ascending by `below_m`
    pub buckets: Vec<DistanceBucket>,
    /// Score when no bucket matches or nothing was found
    pub floor: u8,
}

impl DistanceTable {
    pub fn parks() -> Self {
        Self {
            radius_m: 2000.0,
            buckets: park_buckets(),
            floor: 20,
        }
    }

    pub fn health() -> Self {
        Self {
            radius_m: 8000.0,
            buckets: health_buckets(),
            floor: 10,
        }
    }

    pub fn education() -> Self {
        Self {
            radius_m: 3000.0,
            buckets: education_buckets(),
            floor: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FallbackScores {
    pub transport: u8,
    pub parks: u8,
    pub health: u8,
    pub education: u8,
    pub safety: u8,
    pub cost_of_living: u8,
}

impl Default for FallbackScores {
    fn default() -> Self {
        Self {
            transport: 50,
            parks: 50,
            health: 50,
            education: 50,
            safety: 50,
            cost_of_living: 50,
        }
    }
}

impl ScoringConfig {
    /// Config with every section spelled out, used by `init`.
    pub fn full_defaults() -> Self {
        Self {
            transport: Some(TransportConfig::default()),
            parks: Some(DistanceTable::parks()),
            health: Some(DistanceTable::health()),
            education: Some(DistanceTable::education()),
            fallbacks: Some(FallbackScores::default()),
            personas: None,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        self.transport.clone().unwrap_or_default()
    }

    pub fn parks(&self) -> DistanceTable {
        self.parks.clone().unwrap_or_else(DistanceTable::parks)
    }

    pub fn health(&self) -> DistanceTable {
        self.health.clone().unwrap_or_else(DistanceTable::health)
    }

    pub fn education(&self) -> DistanceTable {
        self.education.clone().unwrap_or_else(DistanceTable::education)
    }

    pub fn fallbacks(&self) -> FallbackScores {
        self.fallbacks.unwrap_or_default()
    }

    /// Weights for `persona`: a configured persona of that name first, then the
    /// built-in table (which maps unknown names to the default profile).
    pub fn resolve_weights(&self, persona: &str) -> WeightVector {
        let wanted = persona.trim();
        if let Some(custom) = self
            .personas
            .as_ref()
            .and_then(|p| p.iter().find(|(name, _)| name.eq_ignore_ascii_case(wanted)))
        {
            return *custom.1;
        }
        Persona::from_name(wanted).weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::resolve_weights;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.transport().radius_m, 500.0);
        assert_eq!(config.parks().radius_m, 2000.0);
        assert_eq!(config.health().floor, 10);
        assert_eq!(config.education().radius_m, 3000.0);
        assert_eq!(config.fallbacks().education, 50);
        assert_eq!(config.fallbacks().safety, 50);
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::full_defaults();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
transport:
  radius_m: 800
  points_per_stop: 5
fallbacks:
  education: 30
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.transport().radius_m, 800.0);
        assert_eq!(config.transport().points_per_stop, 5);
        assert_eq!(config.fallbacks().education, 30);
        // Untouched fallbacks keep their defaults
        assert_eq!(config.fallbacks().parks, 50);
        assert!(config.parks.is_none());
        assert_eq!(config.parks(), DistanceTable::parks());
    }

    #[test]
    fn test_full_scoring_config_parse() {
        let yaml = r#"
parks:
  radius_m: 1500
  floor: 0
  buckets:
    - below_m: 200
      score: 100
    - below_m: 800
      score: 50
personas:
  commuter:
    transport: 0.4
    parks: 0.1
    health: 0.1
    education: 0.1
    safety: 0.1
    cost_of_living: 0.2
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        let parks = config.parks();
        assert_eq!(parks.radius_m, 1500.0);
        assert_eq!(parks.floor, 0);
        assert_eq!(parks.buckets.len(), 2);
        assert_eq!(config.resolve_weights("commuter").transport, 0.4);
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "cost: { radius_m: 5 }";
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }

    #[test]
    fn test_resolve_weights_prefers_custom() {
        let mut personas = BTreeMap::new();
        let custom = WeightVector {
            transport: 0.5,
            parks: 0.1,
            health: 0.1,
            education: 0.1,
            safety: 0.1,
            cost_of_living: 0.1,
        };
        personas.insert("Student".to_string(), custom);
        let config = ScoringConfig {
            personas: Some(personas),
            ..Default::default()
        };

        assert_eq!(config.resolve_weights("student"), custom);
        assert_eq!(config.resolve_weights("senior"), resolve_weights("senior"));
        assert_eq!(config.resolve_weights("nobody"), resolve_weights("default"));
    }
}

use super::config::{DistanceTable, ScoringConfig};
use super::persona::WeightVector;
use crate::city::types::Category;

const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref transport) = config.transport {
        if !transport.radius_m.is_finite() || transport.radius_m <= 0.0 {
            errors.push(format!(
                "scoring.transport.radius_m: must be positive, got {}",
                transport.radius_m
            ));
        }
    }

    for (name, table) in [
        ("parks", &config.parks),
        ("health", &config.health),
        ("education", &config.education),
    ] {
        if let Some(table) = table {
            validate_table(name, table, &mut errors);
        }
    }

    if let Some(ref fallbacks) = config.fallbacks {
        for (key, score) in [
            ("transport", fallbacks.transport),
            ("parks", fallbacks.parks),
            ("health", fallbacks.health),
            ("education", fallbacks.education),
            ("safety", fallbacks.safety),
            ("cost_of_living", fallbacks.cost_of_living),
        ] {
            if score > 100 {
                errors.push(format!(
                    "scoring.fallbacks.{}: must be within 0-100, got {}",
                    key, score
                ));
            }
        }
    }

    if let Some(ref personas) = config.personas {
        for (name, weights) in personas {
            validate_weights(&format!("scoring.personas.{}", name), weights, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_table(name: &str, table: &DistanceTable, errors: &mut Vec<String>) {
    if !table.radius_m.is_finite() || table.radius_m <= 0.0 {
        errors.push(format!(
            "scoring.{}.radius_m: must be positive, got {}",
            name, table.radius_m
        ));
    }
    if table.floor > 100 {
        errors.push(format!(
            "scoring.{}.floor: must be within 0-100, got {}",
            name, table.floor
        ));
    }

    let mut previous: Option<(f64, u8)> = None;
    for (i, bucket) in table.buckets.iter().enumerate() {
        if !bucket.below_m.is_finite() || bucket.below_m <= 0.0 {
            errors.push(format!(
                "scoring.{}.buckets[{}].below_m: must be positive, got {}",
                name, i, bucket.below_m
            ));
        }
        if bucket.score > 100 {
            errors.push(format!(
                "scoring.{}.buckets[{}].score: must be within 0-100, got {}",
                name, i, bucket.score
            ));
        }
        if let Some((prev_below, prev_score)) = previous {
            if bucket.below_m <= prev_below {
                errors.push(format!(
                    "scoring.{}.buckets[{}].below_m: must be greater than the previous bound {}",
                    name, i, prev_below
                ));
            }
            if bucket.score > prev_score {
                errors.push(format!(
                    "scoring.{}.buckets[{}].score: farther buckets may not score higher ({} > {})",
                    name, i, bucket.score, prev_score
                ));
            }
        }
        previous = Some((bucket.below_m, bucket.score));
    }

    if let Some((_, last_score)) = previous {
        if table.floor > last_score {
            errors.push(format!(
                "scoring.{}.floor: may not exceed the last bucket's score ({} > {})",
                name, table.floor, last_score
            ));
        }
    }
}

fn validate_weights(path: &str, weights: &WeightVector, errors: &mut Vec<String>) {
    let mut all_valid = true;
    for category in Category::ALL {
        let w = weights.get(category);
        if !w.is_finite() || w < 0.0 {
            errors.push(format!(
                "{}.{}: weight must be a non-negative number, got {}",
                path,
                category.key(),
                w
            ));
            all_valid = false;
        }
    }

    if all_valid {
        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("{}: weights must sum to 1.0, got {:.3}", path, sum));
        }
    }
}

use serde::{Deserialize, Serialize};

/// Step of a distance table: anything strictly closer than `below_m` earns `score`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DistanceBucket {
    pub below_m: f64,
    pub score: u8,
}

/// Map a distance onto a step table.
///
/// Buckets are checked in order, first match wins, so they must be sorted
/// ascending by `below_m` (see `validate_scoring`). Distances no bucket covers,
/// including `f64::INFINITY` for "nothing found", get `floor`.
pub fn score_by_distance(distance_m: f64, buckets: &[DistanceBucket], floor: u8) -> u8 {
    buckets
        .iter()
        .find(|b| distance_m < b.below_m)
        .map(|b| b.score)
        .unwrap_or(floor)
        .min(100)
}

/// Transit score grows linearly with the number of stops in range, capped at 100.
pub fn score_by_count(count: usize, points_per_stop: u8) -> u8 {
    let raw = count.saturating_mul(points_per_stop as usize);
    raw.min(100) as u8
}

pub fn park_buckets() -> Vec<DistanceBucket> {
    vec![
        DistanceBucket { below_m: 100.0, score: 100 },
        DistanceBucket { below_m: 300.0, score: 80 },
        DistanceBucket { below_m: 500.0, score: 60 },
        DistanceBucket { below_m: 1000.0, score: 40 },
    ]
}

pub fn education_buckets() -> Vec<DistanceBucket> {
    park_buckets()
}

pub fn health_buckets() -> Vec<DistanceBucket> {
    vec![
        DistanceBucket { below_m: 500.0, score: 100 },
        DistanceBucket { below_m: 1000.0, score: 85 },
        DistanceBucket { below_m: 2000.0, score: 70 },
        DistanceBucket { below_m: 4000.0, score: 50 },
        DistanceBucket { below_m: 8000.0, score: 30 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_park_table() {
        let b = park_buckets();
        assert_eq!(score_by_distance(0.0, &b, 20), 100);
        assert_eq!(score_by_distance(99.9, &b, 20), 100);
        assert_eq!(score_by_distance(100.0, &b, 20), 80); // bound is exclusive
        assert_eq!(score_by_distance(250.0, &b, 20), 80);
        assert_eq!(score_by_distance(499.0, &b, 20), 60);
        assert_eq!(score_by_distance(999.0, &b, 20), 40);
        assert_eq!(score_by_distance(1000.0, &b, 20), 20);
    }

    #[test]
    fn test_health_table() {
        let b = health_buckets();
        assert_eq!(score_by_distance(400.0, &b, 10), 100);
        assert_eq!(score_by_distance(900.0, &b, 10), 85);
        assert_eq!(score_by_distance(1500.0, &b, 10), 70);
        assert_eq!(score_by_distance(3999.0, &b, 10), 50);
        assert_eq!(score_by_distance(7000.0, &b, 10), 30);
        assert_eq!(score_by_distance(9000.0, &b, 10), 10);
    }

    #[test]
    fn test_nothing_found_gets_floor() {
        assert_eq!(score_by_distance(f64::INFINITY, &park_buckets(), 20), 20);
        assert_eq!(score_by_distance(f64::INFINITY, &health_buckets(), 10), 10);
    }

    #[test]
    fn test_empty_table_gets_floor() {
        assert_eq!(score_by_distance(5.0, &[], 33), 33);
    }

    #[test]
    fn test_monotonic_in_distance() {
        for buckets in [park_buckets(), health_buckets()] {
            let mut previous = u8::MAX;
            let mut d = 0.0;
            while d < 10_000.0 {
                let s = score_by_distance(d, &buckets, 10);
                assert!(s <= previous, "score rose from {} to {} at {} m", previous, s, d);
                previous = s;
                d += 7.5;
            }
        }
    }

    #[test]
    fn test_score_by_count() {
        assert_eq!(score_by_count(0, 10), 0);
        assert_eq!(score_by_count(6, 10), 60);
        assert_eq!(score_by_count(10, 10), 100);
        assert_eq!(score_by_count(42, 10), 100);
        assert_eq!(score_by_count(usize::MAX, 10), 100);
    }
}

use crate::city::types::DistrictStat;

/// Score used when a statistic cannot be placed relative to other districts.
pub const NEUTRAL_SCORE: u8 = 50;

/// Min-max rescale `value` against all districts' values into 0-100.
///
/// `value` always takes part in the min/max so the result is defined even when
/// `all_values` omits it. A degenerate range (every district equal) yields
/// [`NEUTRAL_SCORE`]. With `invert`, lower raw values score higher.
pub fn normalize(value: f64, all_values: &[f64], invert: bool) -> u8 {
    if !value.is_finite() {
        return NEUTRAL_SCORE;
    }

    let (min, max) = all_values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((value, value), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if max == min {
        return NEUTRAL_SCORE;
    }

    let mut normalized = (value - min) / (max - min);
    if invert {
        normalized = 1.0 - normalized;
    }

    (normalized * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Find a district's value in a table. Matching ignores case and surrounding whitespace.
pub fn find_district<'a>(stats: &'a [DistrictStat], district: &str) -> Option<&'a DistrictStat> {
    let wanted = district.trim().to_lowercase();
    stats
        .iter()
        .find(|s| s.district.trim().to_lowercase() == wanted)
}

/// Score one district against the whole table, [`NEUTRAL_SCORE`] if it is absent.
pub fn district_score(stats: &[DistrictStat], district: &str, invert: bool) -> u8 {
    match find_district(stats, district) {
        Some(stat) => {
            let all: Vec<f64> = stats.iter().map(|s| s.value).collect();
            normalize(stat.value, &all, invert)
        }
        None => NEUTRAL_SCORE,
    }
}

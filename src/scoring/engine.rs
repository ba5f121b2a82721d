use super::persona::{WeightPercentages, WeightVector};
use crate::city::types::{Category, CategoryScores, CityData};
use serde::{Deserialize, Serialize};

/// One category's share of the total, for audits and verbose output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    pub category: Category,
    pub score: u8,
    pub weight: f64,
    pub points: f64, // score * weight
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QolResult {
    pub total_score: u8,
    pub breakdown: CategoryScores,
    pub weights_used: WeightPercentages,
    pub contributions: Vec<CategoryContribution>,
}

/// Weighted sum of the six category scores, rounded and clamped to 0-100.
pub fn compute_qol(data: &CityData, weights: &WeightVector) -> QolResult {
    let contributions: Vec<CategoryContribution> = Category::ALL
        .iter()
        .map(|&category| {
            let score = data.scores.get(category);
            let weight = weights.get(category);
            CategoryContribution {
                category,
                score,
                weight,
                points: score as f64 * weight,
            }
        })
        .collect();

    let raw: f64 = contributions.iter().map(|c| c.points).sum();

    // Malformed weight vectors (negative, NaN, summing past 1) must not escape 0-100
    let total_score = if raw.is_finite() {
        raw.round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    QolResult {
        total_score,
        breakdown: data.scores.clone(),
        weights_used: weights.as_percentages(),
        contributions,
    }
}

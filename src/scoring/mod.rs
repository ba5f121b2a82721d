pub mod config;
pub mod distance;
pub mod engine;
pub mod normalize;
pub mod persona;
pub mod validation;

pub use config::*;
pub use distance::{score_by_count, score_by_distance, DistanceBucket};
pub use engine::{compute_qol, CategoryContribution, QolResult};
pub use normalize::{district_score, normalize, NEUTRAL_SCORE};
pub use persona::{resolve_weights, Persona, WeightPercentages, WeightVector};
pub use validation::validate_scoring;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("expected \"LAT,LNG\", got '{0}'")]
    Format(String),
}

/// A WGS84 point. Always finite and within range once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    /// Parse "48.2082,16.3738" (whitespace around either part is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordinateError::Format(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordinateError::Format(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| CoordinateError::Format(s.to_string()))?;
        Coordinate::new(lat, lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

/// One park, hospital, school or transit stop reported near a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityFact {
    pub name: String,
    pub coordinate: Coordinate,
}

/// One district's value for a statistic (crime count, rent per m²).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictStat {
    pub district: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transport,
    Parks,
    Health,
    Education,
    Safety,
    CostOfLiving,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Transport,
        Category::Parks,
        Category::Health,
        Category::Education,
        Category::Safety,
        Category::CostOfLiving,
    ];

    /// Canonical config/JSON key.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Transport => "transport",
            Category::Parks => "parks",
            Category::Health => "health",
            Category::Education => "education",
            Category::Safety => "safety",
            Category::CostOfLiving => "cost_of_living",
        }
    }

    /// Human readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Transport => "Transport",
            Category::Parks => "Green Area",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Safety => "Safety",
            Category::CostOfLiving => "Cost of Living",
        }
    }
}

/// The six 0-100 category scores for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub transport: u8,
    pub parks: u8,
    pub health: u8,
    pub education: u8,
    pub safety: u8,
    pub cost_of_living: u8,
    pub closest_park: String,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Transport => self.transport,
            Category::Parks => self.parks,
            Category::Health => self.health,
            Category::Education => self.education,
            Category::Safety => self.safety,
            Category::CostOfLiving => self.cost_of_living,
        }
    }
}

/// Everything known about one address after the category fan-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityData {
    pub coordinate: Coordinate,
    pub district: String,
    pub scores: CategoryScores,
}

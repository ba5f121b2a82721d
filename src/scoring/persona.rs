use crate::city::types::Category;
use serde::{Deserialize, Serialize};

/// Relative importance of each category. Keys match [`Category::key`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightVector {
    pub transport: f64,
    pub parks: f64,
    pub health: f64,
    pub education: f64,
    pub safety: f64,
    pub cost_of_living: f64,
}

impl WeightVector {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transport => self.transport,
            Category::Parks => self.parks,
            Category::Health => self.health,
            Category::Education => self.education,
            Category::Safety => self.safety,
            Category::CostOfLiving => self.cost_of_living,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Integer percentages for display, e.g. 0.15 -> 15.
    pub fn as_percentages(&self) -> WeightPercentages {
        let pct = |w: f64| (w * 100.0).round().clamp(0.0, u8::MAX as f64) as u8;
        WeightPercentages {
            transport: pct(self.transport),
            parks: pct(self.parks),
            health: pct(self.health),
            education: pct(self.education),
            safety: pct(self.safety),
            cost_of_living: pct(self.cost_of_living),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightPercentages {
    pub transport: u8,
    pub parks: u8,
    pub health: u8,
    pub education: u8,
    pub safety: u8,
    pub cost_of_living: u8,
}

impl WeightPercentages {
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

/// Built-in user profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Student,
    Parent,
    Senior,
    Unemployed,
    Default,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::Student,
        Persona::Parent,
        Persona::Senior,
        Persona::Unemployed,
        Persona::Default,
    ];

    /// Look up a persona by name. Anything unrecognised is `Default`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "student" => Persona::Student,
            "parent" => Persona::Parent,
            "senior" => Persona::Senior,
            "unemployed" => Persona::Unemployed,
            _ => Persona::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Persona::Student => "student",
            Persona::Parent => "parent",
            Persona::Senior => "senior",
            Persona::Unemployed => "unemployed",
            Persona::Default => "default",
        }
    }

    pub fn weights(&self) -> WeightVector {
        match self {
            Persona::Student => WeightVector {
                transport: 0.25,
                parks: 0.10,
                health: 0.10,
                safety: 0.10,
                education: 0.30,
                cost_of_living: 0.15,
            },
            Persona::Parent => WeightVector {
                transport: 0.15,
                parks: 0.15,
                health: 0.20,
                safety: 0.20,
                education: 0.25,
                cost_of_living: 0.05,
            },
            Persona::Senior => WeightVector {
                transport: 0.10,
                parks: 0.20,
                health: 0.30,
                safety: 0.30,
                education: 0.05,
                cost_of_living: 0.05,
            },
            Persona::Unemployed => WeightVector {
                transport: 0.25,
                parks: 0.05,
                health: 0.15,
                safety: 0.10,
                education: 0.10,
                cost_of_living: 0.35,
            },
            Persona::Default => WeightVector {
                transport: 0.15,
                parks: 0.15,
                health: 0.20,
                safety: 0.20,
                education: 0.15,
                cost_of_living: 0.15,
            },
        }
    }
}

/// Weights for a built-in persona name; unknown names get the default profile.
pub fn resolve_weights(persona: &str) -> WeightVector {
    Persona::from_name(persona).weights()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_weights() {
        let w = resolve_weights("student");
        assert_eq!(w.transport, 0.25);
        assert_eq!(w.education, 0.30);
        assert_eq!(w.cost_of_living, 0.15);
    }

    #[test]
    fn test_unknown_persona_falls_back_to_default() {
        assert_eq!(resolve_weights("unknown-persona"), resolve_weights("default"));
        assert_eq!(resolve_weights(""), Persona::Default.weights());
    }

    #[test]
    fn test_persona_name_is_case_insensitive() {
        assert_eq!(Persona::from_name("  Senior "), Persona::Senior);
        assert_eq!(resolve_weights("PARENT"), Persona::Parent.weights());
    }

    #[test]
    fn test_builtin_personas_sum_to_one() {
        for persona in Persona::ALL {
            let sum = persona.weights().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", persona.name(), sum);
        }
    }

    #[test]
    fn test_percentages() {
        let pct = Persona::Unemployed.weights().as_percentages();
        assert_eq!(pct.transport, 25);
        assert_eq!(pct.parks, 5);
        assert_eq!(pct.cost_of_living, 35);
        assert_eq!(pct.get(Category::Health), 15);
    }

    #[test]
    fn test_weight_vector_yaml_keys() {
        let yaml = r#"
transport: 0.4
parks: 0.1
health: 0.1
education: 0.1
safety: 0.1
cost_of_living: 0.2
"#;
        let w: WeightVector = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(w.transport, 0.4);
        assert_eq!(w.cost_of_living, 0.2);
    }

    #[test]
    fn test_weight_vector_rejects_legacy_keys() {
        let yaml = r#"
transport: 0.4
park: 0.1
health: 0.1
education: 0.1
safety: 0.1
cost: 0.2
"#;
        assert!(serde_saphyr::from_str::<WeightVector>(yaml).is_err());
    }
}

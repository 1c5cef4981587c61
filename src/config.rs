//! Agent configuration.
//!
//! Search depth, evaluation function and root parallelism. Loaded from JSON
//! or built up one protocol option at a time.

use serde::{Deserialize, Serialize};

use crate::eval::{Heuristic, UnknownHeuristic, Weights};

/// Default search depth in plies.
pub const DEFAULT_DEPTH: u32 = 2;

/// Deepest search accepted. Exhaustive minimax grows as `b^d`.
pub const MAX_DEPTH: u32 = 8;

/// Errors that can occur when loading or updating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("depth must be between 1 and {max}, got {0}", max = MAX_DEPTH)]
    InvalidDepth(u32),

    #[error(transparent)]
    UnknownHeuristic(#[from] UnknownHeuristic),

    #[error("weight {0} must be finite")]
    NonFiniteWeight(&'static str),

    #[error("option {name} only applies to the composite heuristic (current: {current})")]
    WeightWithoutComposite { name: String, current: &'static str },

    #[error("invalid value for option {name}: '{value}'")]
    InvalidValue { name: String, value: String },

    #[error("option {0} requires a value")]
    MissingValue(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// How an agent searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Fixed search depth in plies.
    pub depth: u32,
    /// Evaluation applied at the depth cutoff.
    pub heuristic: Heuristic,
    /// Search root children on the rayon pool.
    pub parallel: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            depth: DEFAULT_DEPTH,
            heuristic: Heuristic::default(),
            parallel: false,
        }
    }
}

impl AgentConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(ConfigError::InvalidDepth(self.depth));
        }
        if let Heuristic::Composite(w) = self.heuristic {
            for (name, value) in [
                ("distance_weight", w.distance_weight),
                ("mobility_weight", w.mobility_weight),
                ("bias", w.bias),
            ] {
                if !value.is_finite() {
                    return Err(ConfigError::NonFiniteWeight(name));
                }
            }
        }
        Ok(())
    }

    /// Applies a `setoption` pair. Names are case-insensitive.
    ///
    /// Recognized: `Depth`, `Heuristic`, `DistanceWeight`, `MobilityWeight`,
    /// `Bias`, `Parallel`. Weight options require the composite heuristic;
    /// re-selecting `composite` keeps weights already set. On error the
    /// config is left unchanged.
    pub fn apply_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let key = name.to_ascii_lowercase();
        let value = value.ok_or_else(|| ConfigError::MissingValue(name.to_string()))?;
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        let mut next = *self;
        match key.as_str() {
            "depth" => {
                next.depth = value.parse().map_err(|_| invalid())?;
            }
            "heuristic" => {
                let heuristic: Heuristic = value.parse()?;
                next.heuristic = match (heuristic, self.heuristic) {
                    (Heuristic::Composite(_), Heuristic::Composite(current)) => {
                        Heuristic::Composite(current)
                    }
                    (h, _) => h,
                };
            }
            "distanceweight" | "mobilityweight" | "bias" => {
                let weight: f64 = value.parse().map_err(|_| invalid())?;
                let Heuristic::Composite(mut weights) = self.heuristic else {
                    return Err(ConfigError::WeightWithoutComposite {
                        name: name.to_string(),
                        current: self.heuristic.name(),
                    });
                };
                set_weight(&mut weights, &key, weight);
                next.heuristic = Heuristic::Composite(weights);
            }
            "parallel" => {
                next.parallel = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" => false,
                    _ => return Err(invalid()),
                };
            }
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }

        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn set_weight(weights: &mut Weights, key: &str, value: f64) {
    match key {
        "distanceweight" => weights.distance_weight = value,
        "mobilityweight" => weights.mobility_weight = value,
        _ => weights.bias = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depth, DEFAULT_DEPTH);
        assert_eq!(config.heuristic, Heuristic::Composite(Weights::default()));
        assert!(!config.parallel);
    }

    #[test]
    fn from_json_fills_defaults() {
        let config = AgentConfig::from_json(r#"{"depth": 4}"#).unwrap();
        assert_eq!(config.depth, 4);
        assert_eq!(config.heuristic, Heuristic::default());

        let config =
            AgentConfig::from_json(r#"{"heuristic": {"kind": "liberties"}, "parallel": true}"#)
                .unwrap();
        assert_eq!(config.heuristic, Heuristic::Liberties);
        assert!(config.parallel);
    }

    #[test]
    fn from_json_rejects_zero_depth() {
        let err = AgentConfig::from_json(r#"{"depth": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDepth(0)));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            AgentConfig::from_json("{depth"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn apply_depth_and_heuristic() {
        let mut config = AgentConfig::default();
        config.apply_option("Depth", Some("4")).unwrap();
        config.apply_option("heuristic", Some("distance")).unwrap();
        assert_eq!(config.depth, 4);
        assert_eq!(config.heuristic, Heuristic::Distance);
    }

    #[test]
    fn apply_depth_out_of_range_leaves_config() {
        let mut config = AgentConfig::default();
        let err = config.apply_option("Depth", Some("12")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDepth(12)));
        assert_eq!(config.depth, DEFAULT_DEPTH);

        let err = config.apply_option("Depth", Some("deep")).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for option Depth: 'deep'");
    }

    #[test]
    fn apply_weights_to_composite() {
        let mut config = AgentConfig::default();
        config.apply_option("DistanceWeight", Some("0.5")).unwrap();
        config.apply_option("MobilityWeight", Some("2")).unwrap();
        config.apply_option("Bias", Some("-1")).unwrap();
        assert_eq!(
            config.heuristic,
            Heuristic::Composite(Weights {
                distance_weight: 0.5,
                mobility_weight: 2.0,
                bias: -1.0,
            })
        );

        // Re-selecting composite keeps the tuned weights.
        config.apply_option("Heuristic", Some("composite")).unwrap();
        assert_eq!(
            config.heuristic,
            Heuristic::Composite(Weights {
                distance_weight: 0.5,
                mobility_weight: 2.0,
                bias: -1.0,
            })
        );
    }

    #[test]
    fn weights_need_composite() {
        let mut config = AgentConfig {
            heuristic: Heuristic::Liberties,
            ..AgentConfig::default()
        };
        let err = config.apply_option("Bias", Some("1")).unwrap_err();
        assert!(matches!(err, ConfigError::WeightWithoutComposite { .. }));
        assert_eq!(config.heuristic, Heuristic::Liberties);
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        let mut config = AgentConfig::default();
        let err = config.apply_option("Bias", Some("NaN")).unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteWeight("bias")));
    }

    #[test]
    fn apply_parallel_flag() {
        let mut config = AgentConfig::default();
        config.apply_option("Parallel", Some("true")).unwrap();
        assert!(config.parallel);
        config.apply_option("Parallel", Some("off")).unwrap();
        assert!(!config.parallel);
        assert!(config.apply_option("Parallel", Some("maybe")).is_err());
    }

    #[test]
    fn unknown_and_valueless_options() {
        let mut config = AgentConfig::default();
        assert!(matches!(
            config.apply_option("Hash", Some("64")),
            Err(ConfigError::UnknownOption(_))
        ));
        assert!(matches!(
            config.apply_option("Depth", None),
            Err(ConfigError::MissingValue(_))
        ));
    }

    #[test]
    fn unknown_heuristic_message() {
        let mut config = AgentConfig::default();
        let err = config.apply_option("Heuristic", Some("mcts")).unwrap_err();
        assert!(err.to_string().starts_with("unknown heuristic 'mcts'"));
    }
}

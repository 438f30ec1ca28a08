//! Rule thresholds and scoring weights
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Inclusive target range for each intent's share of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceBand {
    pub min: f64,
    pub max: f64,
}

impl Default for BalanceBand {
    fn default() -> Self {
        Self {
            min: 0.15,
            max: 0.25,
        }
    }
}

impl BalanceBand {
    pub fn contains(&self, fraction: f64) -> bool {
        fraction + crate::TOLERANCE >= self.min && fraction - crate::TOLERANCE <= self.max
    }
}

/// Weights for the aggregate quality score
///
/// `approval` and `violation` weight the two score components; `error` and
/// `warning` weight each violation when computing the violation rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub approval: f64,
    pub violation: f64,
    pub error: f64,
    pub warning: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            approval: 0.7,
            violation: 0.3,
            error: 1.0,
            warning: 0.25,
        }
    }
}

/// Thresholds applied by the validators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Target share band for every intent
    pub balance_band: BalanceBand,
    /// Largest acceptable share of `low` confidence rows
    pub max_low_confidence: f64,
    /// Minimum box area as a fraction of image area, non-background boxes
    pub min_box_area: f64,
    /// Minimum box area as a fraction of image area, background boxes
    pub min_background_area: f64,
    /// Largest area fraction a background box may cover
    pub max_background_area: f64,
    /// Minimum fraction of a box that must lie inside the image
    pub min_visible: f64,
    pub weights: ScoreWeights,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            balance_band: BalanceBand::default(),
            max_low_confidence: 0.10,
            min_box_area: 0.10,
            min_background_area: 0.01,
            max_background_area: 0.50,
            min_visible: 0.30,
            weights: ScoreWeights::default(),
        }
    }
}

impl ValidatorConfig {
    /// Reject thresholds that cannot be applied
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("balance_band.min", self.balance_band.min),
            ("balance_band.max", self.balance_band.max),
            ("max_low_confidence", self.max_low_confidence),
            ("min_box_area", self.min_box_area),
            ("min_background_area", self.min_background_area),
            ("max_background_area", self.max_background_area),
            ("min_visible", self.min_visible),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::configuration(format!(
                    "{} must be a fraction between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.balance_band.min > self.balance_band.max {
            return Err(Error::configuration(format!(
                "balance band minimum {} exceeds maximum {}",
                self.balance_band.min, self.balance_band.max
            )));
        }

        let weights = [
            ("weights.approval", self.weights.approval),
            ("weights.violation", self.weights.violation),
            ("weights.error", self.weights.error),
            ("weights.warning", self.weights.warning),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::configuration(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.weights.approval + self.weights.violation == 0.0 {
            return Err(Error::configuration(
                "weights.approval and weights.violation cannot both be zero",
            ));
        }

        Ok(())
    }
}

// Scoring rule set: a flat map from stat category to coefficient.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::FG_BUCKETS;

// ---------------------------------------------------------------------------
// Rule keys
// ---------------------------------------------------------------------------

pub const PASS_YARDS_PER_POINT: &str = "pass_yards_per_point";
pub const PASS_TD: &str = "pass_td";
pub const PASS_INT: &str = "pass_int";
pub const RUSH_YARDS_PER_POINT: &str = "rush_yards_per_point";
pub const RUSH_TD: &str = "rush_td";
pub const REC_YARDS_PER_POINT: &str = "rec_yards_per_point";
pub const REC_TD: &str = "rec_td";
pub const PPR: &str = "ppr";
pub const TWO_PT_CONV: &str = "two_pt_conv";
pub const FUMBLE_LOST: &str = "fumble_lost";
pub const RETURN_TD: &str = "return_td";
pub const FG_MISS: &str = "fg_miss";
pub const XP_MADE: &str = "xp_made";
pub const XP_MISS: &str = "xp_miss";
pub const SACK: &str = "sack";
pub const DEF_INT: &str = "def_int";
pub const FUM_REC: &str = "fum_rec";
pub const DST_TD: &str = "dst_td";
pub const SAFETY: &str = "safety";
pub const BLOCK: &str = "block";

/// Points-allowed tiers as `(rule key, min, max)`, both bounds inclusive.
/// Ordered from the shutout tier down to the 35+ tier.
pub const PA_TIERS: [(&str, u32, u32); 7] = [
    ("pa_0", 0, 0),
    ("pa_1_6", 1, 6),
    ("pa_7_13", 7, 13),
    ("pa_14_20", 14, 20),
    ("pa_21_27", 21, 27),
    ("pa_28_34", 28, 34),
    ("pa_35_plus", 35, u32::MAX),
];

/// Rule key of the tier a defense that allowed `points` falls into.
pub fn pa_tier(points: u32) -> &'static str {
    PA_TIERS
        .iter()
        .find(|(_, lo, hi)| (*lo..=*hi).contains(&points))
        .map(|(key, _, _)| *key)
        .unwrap_or("pa_35_plus")
}

/// Keys whose value is a yards-per-point divisor rather than a multiplier.
pub const DIVISOR_KEYS: [&str; 3] = [PASS_YARDS_PER_POINT, RUSH_YARDS_PER_POINT, REC_YARDS_PER_POINT];

/// Every key a complete rule set must define.
pub fn required_keys() -> Vec<&'static str> {
    let mut keys = vec![
        PASS_YARDS_PER_POINT,
        PASS_TD,
        PASS_INT,
        RUSH_YARDS_PER_POINT,
        RUSH_TD,
        REC_YARDS_PER_POINT,
        REC_TD,
        PPR,
        TWO_PT_CONV,
        FUMBLE_LOST,
        RETURN_TD,
    ];
    keys.extend(FG_BUCKETS.iter().map(|(key, _, _)| *key));
    keys.extend([FG_MISS, XP_MADE, XP_MISS, SACK, DEF_INT, FUM_REC, DST_TD, SAFETY, BLOCK]);
    keys.extend(PA_TIERS.iter().map(|(key, _, _)| *key));
    keys
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("scoring rule `{0}` is not defined")]
    MissingRule(String),

    #[error("scoring rule `{key}` is invalid: {message}")]
    InvalidRule { key: String, message: String },
}

// ---------------------------------------------------------------------------
// ScoringRules
// ---------------------------------------------------------------------------

/// Season-scoped scoring configuration.
///
/// Lookups never fall back to a default: a missing key is an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringRules {
    coefficients: BTreeMap<String, f64>,
}

impl ScoringRules {
    pub fn new(coefficients: BTreeMap<String, f64>) -> Self {
        ScoringRules { coefficients }
    }

    /// Standard full-PPR rules used by the playoff contest.
    pub fn standard_ppr() -> Self {
        let pairs: [(&str, f64); 32] = [
            (PASS_YARDS_PER_POINT, 25.0),
            (PASS_TD, 4.0),
            (PASS_INT, -2.0),
            (RUSH_YARDS_PER_POINT, 10.0),
            (RUSH_TD, 6.0),
            (REC_YARDS_PER_POINT, 10.0),
            (REC_TD, 6.0),
            (PPR, 1.0),
            (TWO_PT_CONV, 2.0),
            (FUMBLE_LOST, -2.0),
            (RETURN_TD, 6.0),
            ("fg_0_19", 3.0),
            ("fg_20_29", 3.0),
            ("fg_30_39", 3.0),
            ("fg_40_49", 4.0),
            ("fg_50_plus", 5.0),
            (FG_MISS, -1.0),
            (XP_MADE, 1.0),
            (XP_MISS, -1.0),
            (SACK, 1.0),
            (DEF_INT, 2.0),
            (FUM_REC, 2.0),
            (DST_TD, 6.0),
            (SAFETY, 2.0),
            (BLOCK, 2.0),
            ("pa_0", 10.0),
            ("pa_1_6", 7.0),
            ("pa_7_13", 4.0),
            ("pa_14_20", 1.0),
            ("pa_21_27", 0.0),
            ("pa_28_34", -1.0),
            ("pa_35_plus", -4.0),
        ];
        ScoringRules::new(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    /// Builder-style override of one coefficient.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.coefficients.insert(key.to_string(), value);
        self
    }

    /// Remove a coefficient. Mostly useful for tests of the error path.
    pub fn without(mut self, key: &str) -> Self {
        self.coefficients.remove(key);
        self
    }

    /// Look up a multiplier. Missing or non-finite values are errors.
    pub fn coefficient(&self, key: &str) -> Result<f64, ScoringError> {
        let value = *self
            .coefficients
            .get(key)
            .ok_or_else(|| ScoringError::MissingRule(key.to_string()))?;
        if !value.is_finite() {
            return Err(ScoringError::InvalidRule {
                key: key.to_string(),
                message: format!("must be finite, got {value}"),
            });
        }
        Ok(value)
    }

    /// Look up a yards-per-point divisor. Must be strictly positive.
    pub fn divisor(&self, key: &str) -> Result<f64, ScoringError> {
        let value = self.coefficient(key)?;
        if value <= 0.0 {
            return Err(ScoringError::InvalidRule {
                key: key.to_string(),
                message: format!("divisor must be > 0, got {value}"),
            });
        }
        Ok(value)
    }

    /// Magnitude of a penalty coefficient. Penalties are always subtracted,
    /// whichever sign the rule file uses.
    pub fn penalty(&self, key: &str) -> Result<f64, ScoringError> {
        Ok(self.coefficient(key)?.abs())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.coefficients.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Check the rule set is complete and well-formed.
    ///
    /// Every required key present and finite, divisors positive, and the
    /// points-allowed tiers non-increasing from the shutout tier down.
    pub fn validate(&self) -> Result<(), ScoringError> {
        for key in required_keys() {
            self.coefficient(key)?;
        }
        for key in DIVISOR_KEYS {
            self.divisor(key)?;
        }
        let mut previous: Option<(&str, f64)> = None;
        for (key, _, _) in PA_TIERS {
            let value = self.coefficient(key)?;
            if let Some((prev_key, prev)) = previous {
                if value > prev {
                    return Err(ScoringError::InvalidRule {
                        key: key.to_string(),
                        message: format!(
                            "points-allowed tiers must not increase: {prev_key} = {prev}, {key} = {value}"
                        ),
                    });
                }
            }
            previous = Some((key, value));
        }
        Ok(())
    }
}

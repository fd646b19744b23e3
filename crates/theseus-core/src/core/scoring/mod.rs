//! Composite fitness and the boolean screening flags derived from descriptors.

use crate::core::descriptors::{Descriptors, SCORED_DESCRIPTOR_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_MOLECULAR_WEIGHT: f64 = 500.0;
const MAX_LOGP: f64 = 5.0;
const MAX_HBD: u32 = 5;
const MAX_HBA: u32 = 10;

const BARRIER_MAX_MOLECULAR_WEIGHT: f64 = 400.0;
const BARRIER_MAX_TPSA: f64 = 60.0;

const VEBER_MAX_ROTATABLE: u32 = 10;
const VEBER_MAX_TPSA: f64 = 140.0;

const NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WeightsError {
    #[error("weights must be finite and non-negative")]
    Negative,
    #[error("weights must not both be zero")]
    ZeroSum,
}

/// Relative weights of the two scored factors. The composite is their weighted average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub rule_of_five: f64,
    pub bioavailability: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            rule_of_five: 0.6,
            bioavailability: 0.4,
        }
    }
}

impl FitnessWeights {
    pub fn new(rule_of_five: f64, bioavailability: f64) -> Result<Self, WeightsError> {
        let weights = Self {
            rule_of_five,
            bioavailability,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), WeightsError> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(self.rule_of_five) || !valid(self.bioavailability) {
            return Err(WeightsError::Negative);
        }
        if self.rule_of_five + self.bioavailability <= 0.0 {
            return Err(WeightsError::ZeroSum);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessResult {
    /// Confidence-adjusted composite in `[0, 1]`; the value used for ranking.
    pub score: f64,
    /// Weighted average of the two factors before confidence adjustment.
    pub composite: f64,
    /// Share of the scored descriptors that were available.
    pub confidence: f64,
    pub rule_of_five_factor: f64,
    pub bioavailability_factor: f64,
    pub violations: u32,
    pub rule_of_five_compliant: bool,
    pub barrier_penetrant: bool,
    pub toxicity_risk: bool,
    pub oral_bioavailable: bool,
    pub gi_absorption_high: bool,
    /// Complexity-based estimate on a 1 (easy) to 10 (hard) scale.
    pub synthetic_accessibility: f64,
}

/// Scores a descriptor record. Pure: equal descriptors always give equal results.
pub fn score(descriptors: &Descriptors, weights: &FitnessWeights) -> FitnessResult {
    let violations = lipinski_violations(descriptors);
    let rule_of_five_factor = (1.0 - 0.2 * f64::from(violations)).max(0.0);
    let bioavailability_factor = bioavailability_factor(descriptors);

    let weight_sum = weights.rule_of_five + weights.bioavailability;
    let composite = if weight_sum > 0.0 {
        (weights.rule_of_five * rule_of_five_factor
            + weights.bioavailability * bioavailability_factor)
            / weight_sum
    } else {
        NEUTRAL_SCORE
    };

    let confidence = descriptors.available_count() as f64 / SCORED_DESCRIPTOR_COUNT as f64;
    let score = (confidence * composite + (1.0 - confidence) * NEUTRAL_SCORE).clamp(0.0, 1.0);

    let mw = descriptors.molecular_weight;
    let tpsa = descriptors.tpsa;

    FitnessResult {
        score,
        composite,
        confidence,
        rule_of_five_factor,
        bioavailability_factor,
        violations,
        rule_of_five_compliant: violations == 0,
        barrier_penetrant: tpsa
            .is_some_and(|t| mw < BARRIER_MAX_MOLECULAR_WEIGHT && t < BARRIER_MAX_TPSA),
        toxicity_risk: violations > 1,
        oral_bioavailable: violations <= 1
            && descriptors.rotatable_bonds <= VEBER_MAX_ROTATABLE
            && tpsa.is_some_and(|t| t <= VEBER_MAX_TPSA),
        gi_absorption_high: mw < MAX_MOLECULAR_WEIGHT
            && descriptors.logp.is_some_and(|p| p < MAX_LOGP)
            && tpsa.is_some_and(|t| t < VEBER_MAX_TPSA),
        synthetic_accessibility: synthetic_accessibility(descriptors),
    }
}

/// Lipinski threshold violations among the available descriptors.
pub fn lipinski_violations(descriptors: &Descriptors) -> u32 {
    [
        descriptors.molecular_weight > MAX_MOLECULAR_WEIGHT,
        descriptors.logp.is_some_and(|p| p > MAX_LOGP),
        descriptors.hbd > MAX_HBD,
        descriptors.hba > MAX_HBA,
    ]
    .into_iter()
    .map(u32::from)
    .sum()
}

fn ramp(x: f64, lo: f64, hi: f64) -> f64 {
    ((x - lo) / (hi - lo)).clamp(0.0, 1.0)
}

fn bioavailability_factor(descriptors: &Descriptors) -> f64 {
    let mw_penalty = 0.5 * ramp(descriptors.molecular_weight, 400.0, 600.0);
    let tpsa_penalty = descriptors
        .tpsa
        .map_or(0.0, |t| 0.5 * ramp(t, 90.0, 140.0));
    1.0 - mw_penalty - tpsa_penalty
}

fn synthetic_accessibility(descriptors: &Descriptors) -> f64 {
    let raw = 3.0
        + 2.0 * f64::from(descriptors.heavy_atom_count) / 30.0
        + 1.5 * f64::from(descriptors.rotatable_bonds) / 8.0
        + 0.5 * f64::from(descriptors.ring_count) / 3.0;
    (raw.clamp(1.0, 10.0) * 100.0).round() / 100.0
}

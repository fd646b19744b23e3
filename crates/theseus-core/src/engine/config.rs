use crate::core::models::element::Element;
use crate::core::scoring::FitnessWeights;
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub const DEFAULT_VOCABULARY: [Element; 7] = [
    Element::C,
    Element::N,
    Element::O,
    Element::S,
    Element::F,
    Element::Cl,
    Element::Br,
];

#[derive(Debug, Clone, PartialEq)]
pub struct MutationConfig {
    /// Elements an `ADD` edit may introduce. Empty disables mutation.
    pub vocabulary: Vec<Element>,
    pub edit_count_min: usize,
    pub edit_count_max: usize,
    /// Attempts per population slot before the slot is dropped.
    pub max_retries: usize,
}

impl MutationConfig {
    pub fn edit_range(&self) -> RangeInclusive<usize> {
        self.edit_count_min..=self.edit_count_max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureConfig {
    pub max_fragments: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub weights: FitnessWeights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub top_k: usize,
    /// Variants less similar to the seed than this count as new chemical entities.
    pub nce_similarity_threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    pub mutation: MutationConfig,
    pub structure: StructureConfig,
    pub scoring: ScoringConfig,
    pub selection: SelectionConfig,
    pub population_size: usize,
    /// Fixed run seed for reproducible populations; drawn from entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation: MutationConfig {
                vocabulary: DEFAULT_VOCABULARY.to_vec(),
                edit_count_min: 3,
                edit_count_max: 5,
                max_retries: 10,
            },
            structure: StructureConfig { max_fragments: 1 },
            scoring: ScoringConfig {
                weights: FitnessWeights::default(),
            },
            selection: SelectionConfig {
                top_k: 5,
                nce_similarity_threshold: 0.7,
            },
            population_size: 100,
            rng_seed: None,
        }
    }
}

#[derive(Default)]
pub struct EvolutionConfigBuilder {
    vocabulary: Option<Vec<Element>>,
    edit_count_min: Option<usize>,
    edit_count_max: Option<usize>,
    max_retries: Option<usize>,
    max_fragments: Option<usize>,
    weights: Option<FitnessWeights>,
    top_k: Option<usize>,
    nce_similarity_threshold: Option<f64>,
    population_size: Option<usize>,
    rng_seed: Option<u64>,
}

impl EvolutionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary(mut self, vocabulary: Vec<Element>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }
    pub fn edit_count_min(mut self, min: usize) -> Self {
        self.edit_count_min = Some(min);
        self
    }
    pub fn edit_count_max(mut self, max: usize) -> Self {
        self.edit_count_max = Some(max);
        self
    }
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }
    pub fn max_fragments(mut self, fragments: usize) -> Self {
        self.max_fragments = Some(fragments);
        self
    }
    pub fn weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = Some(weights);
        self
    }
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }
    pub fn nce_similarity_threshold(mut self, threshold: f64) -> Self {
        self.nce_similarity_threshold = Some(threshold);
        self
    }
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }
    pub fn rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Builds the configuration. Only the population size is required; every other
    /// parameter falls back to [`EvolutionConfig::default`].
    pub fn build(self) -> Result<EvolutionConfig, ConfigError> {
        let defaults = EvolutionConfig::default();
        let population_size = self
            .population_size
            .ok_or(ConfigError::MissingParameter("population_size"))?;

        let mut vocabulary = Vec::new();
        for element in self.vocabulary.unwrap_or(defaults.mutation.vocabulary) {
            if element == Element::H {
                return Err(invalid(
                    "vocabulary",
                    "hydrogen cannot be added or removed explicitly",
                ));
            }
            if !element.is_organic_subset() {
                return Err(invalid(
                    "vocabulary",
                    format!("{element} is not an organic-subset element"),
                ));
            }
            if !vocabulary.contains(&element) {
                vocabulary.push(element);
            }
        }

        let mutation = MutationConfig {
            vocabulary,
            edit_count_min: self
                .edit_count_min
                .unwrap_or(defaults.mutation.edit_count_min),
            edit_count_max: self
                .edit_count_max
                .unwrap_or(defaults.mutation.edit_count_max),
            max_retries: self.max_retries.unwrap_or(defaults.mutation.max_retries),
        };
        if mutation.edit_count_min == 0 {
            return Err(invalid("edit_count_min", "must be at least 1"));
        }
        if mutation.edit_count_max < mutation.edit_count_min {
            return Err(invalid(
                "edit_count_max",
                format!(
                    "must not be smaller than edit_count_min ({})",
                    mutation.edit_count_min
                ),
            ));
        }
        if mutation.max_retries == 0 {
            return Err(invalid("max_retries", "must be at least 1"));
        }

        let structure = StructureConfig {
            max_fragments: self
                .max_fragments
                .unwrap_or(defaults.structure.max_fragments),
        };
        if structure.max_fragments == 0 {
            return Err(invalid("max_fragments", "must be at least 1"));
        }

        let weights = self.weights.unwrap_or(defaults.scoring.weights);
        weights
            .validate()
            .map_err(|e| invalid("weights", e.to_string()))?;

        let selection = SelectionConfig {
            top_k: self.top_k.unwrap_or(defaults.selection.top_k),
            nce_similarity_threshold: self
                .nce_similarity_threshold
                .unwrap_or(defaults.selection.nce_similarity_threshold),
        };
        if selection.top_k == 0 {
            return Err(invalid("top_k", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&selection.nce_similarity_threshold) {
            return Err(invalid(
                "nce_similarity_threshold",
                "must lie between 0 and 1",
            ));
        }
        if population_size == 0 {
            return Err(invalid("population_size", "must be at least 1"));
        }

        Ok(EvolutionConfig {
            mutation,
            structure,
            scoring: ScoringConfig { weights },
            selection,
            population_size,
            rng_seed: self.rng_seed,
        })
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_population_size() {
        assert_eq!(
            EvolutionConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("population_size"))
        );
    }

    #[test]
    fn unset_parameters_take_documented_defaults() {
        let config = EvolutionConfigBuilder::new()
            .population_size(100)
            .build()
            .unwrap();
        assert_eq!(config, EvolutionConfig::default());
        assert_eq!(config.mutation.edit_range(), 3..=5);
        assert_eq!(config.selection.top_k, 5);
    }

    #[test]
    fn vocabulary_rejects_hydrogen_and_removes_duplicates() {
        let err = EvolutionConfigBuilder::new()
            .population_size(10)
            .vocabulary(vec![Element::C, Element::H])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "vocabulary", .. }));

        let config = EvolutionConfigBuilder::new()
            .population_size(10)
            .vocabulary(vec![Element::N, Element::C, Element::N])
            .build()
            .unwrap();
        assert_eq!(config.mutation.vocabulary, vec![Element::N, Element::C]);
    }

    #[test]
    fn empty_vocabulary_is_allowed() {
        let config = EvolutionConfigBuilder::new()
            .population_size(10)
            .vocabulary(Vec::new())
            .build()
            .unwrap();
        assert!(config.mutation.vocabulary.is_empty());
    }

    #[test]
    fn edit_range_must_be_ordered_and_positive() {
        let inverted = EvolutionConfigBuilder::new()
            .population_size(10)
            .edit_count_min(4)
            .edit_count_max(2)
            .build();
        assert!(matches!(
            inverted,
            Err(ConfigError::InvalidParameter { name: "edit_count_max", .. })
        ));
        let zero = EvolutionConfigBuilder::new()
            .population_size(10)
            .edit_count_min(0)
            .build();
        assert!(matches!(
            zero,
            Err(ConfigError::InvalidParameter { name: "edit_count_min", .. })
        ));
    }

    #[test]
    fn numeric_limits_are_validated() {
        let base = || EvolutionConfigBuilder::new().population_size(10);
        assert!(base().max_retries(0).build().is_err());
        assert!(base().top_k(0).build().is_err());
        assert!(base().max_fragments(0).build().is_err());
        assert!(base().nce_similarity_threshold(1.5).build().is_err());
        assert!(
            base()
                .weights(FitnessWeights {
                    rule_of_five: -1.0,
                    bioavailability: 1.0
                })
                .build()
                .is_err()
        );
        assert!(
            EvolutionConfigBuilder::new()
                .population_size(0)
                .build()
                .is_err()
        );
    }
}

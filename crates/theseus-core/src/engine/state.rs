use super::mutation::MutationOperation;
use crate::core::descriptors::{self, Descriptors};
use crate::core::models::molecule::Molecule;
use crate::core::scoring::{self, FitnessResult, FitnessWeights};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Identifies a variant by its generation and its position in that generation's
/// population. Written as `g<generation>-<index>`, e.g. `g2-17`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantId {
    pub generation: usize,
    pub index: usize,
}

impl VariantId {
    pub const SEED: Self = Self {
        generation: 0,
        index: 0,
    };

    pub fn new(generation: usize, index: usize) -> Self {
        Self { generation, index }
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}-{}", self.generation, self.index)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid variant id '{0}': expected the form g<generation>-<index>")]
pub struct ParseVariantIdError(pub String);

impl FromStr for VariantId {
    type Err = ParseVariantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVariantIdError(s.to_string());
        let rest = s
            .trim()
            .strip_prefix(['g', 'G'])
            .ok_or_else(err)?;
        let (generation, index) = rest.split_once('-').ok_or_else(err)?;
        Ok(Self {
            generation: generation.parse().map_err(|_| err())?,
            index: index.parse().map_err(|_| err())?,
        })
    }
}

impl Serialize for VariantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VariantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// One scored member of a population.
#[derive(Debug, Clone)]
pub struct Variant {
    pub id: VariantId,
    pub molecule: Molecule,
    pub parent_id: Option<VariantId>,
    pub mutations_this_step: Vec<MutationOperation>,
    pub cumulative_mutation_count: usize,
    pub descriptors: Descriptors,
    pub fitness: FitnessResult,
    /// Tanimoto similarity of this structure to the generation-0 seed.
    pub similarity_to_seed: f64,
    pub novel_entity: bool,
}

impl Variant {
    /// The generation-0 variant for a seed structure.
    pub fn seed(molecule: Molecule, weights: &FitnessWeights) -> Self {
        let descriptors = descriptors::describe(&molecule);
        let fitness = scoring::score(&descriptors, weights);
        Self {
            id: VariantId::SEED,
            molecule,
            parent_id: None,
            mutations_this_step: Vec::new(),
            cumulative_mutation_count: 0,
            descriptors,
            fitness,
            similarity_to_seed: 1.0,
            novel_entity: false,
        }
    }

    pub fn generation(&self) -> usize {
        self.id.generation
    }
}

/// Per-generation bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub requested: usize,
    pub produced: usize,
    pub dropped: usize,
    /// Distinct canonical structures in the population.
    pub distinct_structures: usize,
    /// Structures that no earlier generation contained.
    pub first_seen_structures: usize,
    pub novel_entities: usize,
    pub best_score: Option<f64>,
    pub mean_score: Option<f64>,
}

impl GenerationStats {
    pub fn collect<'a>(
        population: &[Variant],
        requested: usize,
        seen_before: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let seen_before: HashSet<&str> = seen_before.into_iter().collect();
        let distinct: HashSet<&str> = population.iter().map(|v| v.molecule.canonical()).collect();
        let scores = population.iter().map(|v| v.fitness.score);
        let produced = population.len();
        Self {
            requested,
            produced,
            dropped: requested.saturating_sub(produced),
            distinct_structures: distinct.len(),
            first_seen_structures: distinct.difference(&seen_before).count(),
            novel_entities: population.iter().filter(|v| v.novel_entity).count(),
            best_score: scores.clone().reduce(f64::max),
            mean_score: (produced > 0).then(|| scores.sum::<f64>() / produced as f64),
        }
    }
}

/// One round of the lineage: a population and, once the caller has chosen, the
/// variant that parented the following round.
#[derive(Debug)]
pub struct Generation {
    pub index: usize,
    pub population: Vec<Variant>,
    pub stats: GenerationStats,
    selected: OnceLock<VariantId>,
}

impl Generation {
    pub fn new(index: usize, population: Vec<Variant>, stats: GenerationStats) -> Self {
        Self {
            index,
            population,
            stats,
            selected: OnceLock::new(),
        }
    }

    pub fn selected(&self) -> Option<VariantId> {
        self.selected.get().copied()
    }

    /// Records the selection. A generation is selected from at most once; later
    /// calls keep the first choice and return `false`.
    pub(crate) fn select(&self, id: VariantId) -> bool {
        self.selected.set(id).is_ok()
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        if id.generation != self.index {
            return None;
        }
        self.population.get(id.index).filter(|v| v.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionState {
    Empty,
    Populated,
    AwaitingSelection,
}

impl fmt::Display for EvolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Populated => "populated",
            Self::AwaitingSelection => "awaiting selection",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::SmilesAdapter;
    use crate::core::io::traits::StructureAdapter;

    fn seed_variant() -> Variant {
        let molecule = SmilesAdapter::default()
            .parse("CC(=O)Nc1ccc(O)cc1")
            .unwrap();
        Variant::seed(molecule, &FitnessWeights::default())
    }

    #[test]
    fn variant_id_round_trips_through_text_and_serde() {
        let id = VariantId::new(2, 17);
        assert_eq!(id.to_string(), "g2-17");
        assert_eq!("g2-17".parse::<VariantId>().unwrap(), id);
        assert_eq!(" G2-17 ".parse::<VariantId>().unwrap(), id);
        assert_eq!(through_toml(&id), "g2-17");
    }

    fn through_toml(id: &VariantId) -> String {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            id: VariantId,
        }
        let text = toml::to_string(&Wrapper { id: *id }).unwrap();
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.id, *id);
        back.id.to_string()
    }

    #[test]
    fn malformed_variant_ids_are_rejected() {
        for text in ["", "g", "2-17", "g2", "g2-", "gx-1", "g-1-2"] {
            assert!(text.parse::<VariantId>().is_err(), "{text}");
        }
    }

    #[test]
    fn seed_variant_has_no_history() {
        let seed = seed_variant();
        assert_eq!(seed.id, VariantId::SEED);
        assert_eq!(seed.generation(), 0);
        assert_eq!(seed.parent_id, None);
        assert!(seed.mutations_this_step.is_empty());
        assert_eq!(seed.cumulative_mutation_count, 0);
        assert!((seed.descriptors.molecular_weight - 151.16).abs() < 0.01);
    }

    #[test]
    fn generation_selection_is_recorded_once() {
        let generation = Generation::new(0, vec![seed_variant()], GenerationStats::default());
        assert_eq!(generation.selected(), None);
        assert!(generation.select(VariantId::SEED));
        assert!(!generation.select(VariantId::new(0, 1)));
        assert_eq!(generation.selected(), Some(VariantId::SEED));
        assert!(generation.variant(VariantId::SEED).is_some());
        assert!(generation.variant(VariantId::new(1, 0)).is_none());
    }

    #[test]
    fn stats_count_drops_duplicates_and_first_sightings() {
        let seed = seed_variant();
        let mut twin = seed.clone();
        twin.id = VariantId::new(0, 1);
        twin.novel_entity = true;
        let population = vec![seed.clone(), twin];
        let stats = GenerationStats::collect(&population, 5, [seed.molecule.canonical()]);
        assert_eq!(stats.produced, 2);
        assert_eq!(stats.dropped, 3);
        assert_eq!(stats.distinct_structures, 1);
        assert_eq!(stats.first_seen_structures, 0);
        assert_eq!(stats.novel_entities, 1);
        assert_eq!(stats.best_score, Some(seed.fitness.score));
        assert!((stats.mean_score.unwrap() - seed.fitness.score).abs() < 1e-12);

        let empty = GenerationStats::collect(&[], 4, std::iter::empty());
        assert_eq!(empty.best_score, None);
        assert_eq!(empty.mean_score, None);
        assert_eq!(empty.dropped, 4);
    }
}

use super::catalog::SeedCatalog;
use crate::core::descriptors::Descriptors;
use crate::core::fingerprint::Fingerprint;
use crate::core::io::smiles::SmilesAdapter;
use crate::core::io::traits::StructureAdapter;
use crate::core::scoring::{FitnessResult, FitnessWeights};
use crate::engine::config::{ConfigError, EvolutionConfig};
use crate::engine::context::PopulationContext;
use crate::engine::error::EngineError;
use crate::engine::mutation::MutationOperation;
use crate::engine::population::{PopulationReport, generate_population};
use crate::engine::progress::{CancellationToken, Progress, ProgressReporter};
use crate::engine::ranking;
use crate::engine::state::{EvolutionState, Generation, GenerationStats, Variant, VariantId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument};

/// The consumer-facing view of a variant, as handed to a UI, a report or an
/// explanation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub id: VariantId,
    pub structure_text: String,
    pub generation: usize,
    pub parent_id: Option<VariantId>,
    pub mutations_this_step: Vec<MutationOperation>,
    pub cumulative_mutation_count: usize,
    pub descriptors: Descriptors,
    pub fitness: FitnessResult,
    pub similarity_to_seed: f64,
    pub novel_entity: bool,
}

impl From<&Variant> for VariantSummary {
    fn from(variant: &Variant) -> Self {
        Self {
            id: variant.id,
            structure_text: variant.molecule.canonical().to_string(),
            generation: variant.generation(),
            parent_id: variant.parent_id,
            mutations_this_step: variant.mutations_this_step.clone(),
            cumulative_mutation_count: variant.cumulative_mutation_count,
            descriptors: variant.descriptors.clone(),
            fitness: variant.fitness.clone(),
            similarity_to_seed: variant.similarity_to_seed,
            novel_entity: variant.novel_entity,
        }
    }
}

/// Result of `evolve` and `continue_evolution`: the new generation's best candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionOutcome {
    pub generation_index: usize,
    pub top_candidates: Vec<VariantSummary>,
    pub stats: GenerationStats,
}

#[derive(Debug)]
struct Lineage {
    generations: Vec<Arc<Generation>>,
    seed_fingerprint: Fingerprint,
    weights: FitnessWeights,
}

/// Owns the generation log of one evolution run.
///
/// Generations are appended, never edited, and shared as `Arc`s, so a
/// [`snapshot`](Self::snapshot) can be read from other threads while the manager
/// goes on. Mutating calls take `&mut self` and are therefore serialized.
#[derive(Debug)]
pub struct GenerationManager<A: StructureAdapter + Sync = SmilesAdapter> {
    adapter: A,
    config: EvolutionConfig,
    run_seed: u64,
    lineage: Option<Lineage>,
    awaiting_selection: AtomicBool,
    cancel: CancellationToken,
}

impl GenerationManager<SmilesAdapter> {
    pub fn new(config: EvolutionConfig) -> Self {
        let adapter = SmilesAdapter::new(config.structure.max_fragments);
        Self::with_adapter(adapter, config)
    }
}

impl<A: StructureAdapter + Sync> GenerationManager<A> {
    pub fn with_adapter(adapter: A, config: EvolutionConfig) -> Self {
        let run_seed = config.rng_seed.unwrap_or_else(rand::random);
        Self {
            adapter,
            config,
            run_seed,
            lineage: None,
            awaiting_selection: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    /// A handle that cancels the population run in progress from another thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> EvolutionState {
        match &self.lineage {
            None => EvolutionState::Empty,
            Some(_) if self.awaiting_selection.load(Ordering::SeqCst) => {
                EvolutionState::AwaitingSelection
            }
            Some(_) => EvolutionState::Populated,
        }
    }

    /// The generation log, oldest first. Empty before the first `evolve`.
    pub fn snapshot(&self) -> Vec<Arc<Generation>> {
        self.lineage
            .as_ref()
            .map(|lineage| lineage.generations.clone())
            .unwrap_or_default()
    }

    pub fn latest_generation(&self) -> Option<&Generation> {
        self.lineage
            .as_ref()
            .and_then(|lineage| lineage.generations.last())
            .map(Arc::as_ref)
    }

    /// Starts a new run from `seed_text`: generation 0 holds the seed alone and
    /// generation 1 its mutated population. `target_weights` replaces the configured
    /// scoring weights for the whole run.
    ///
    /// A previous run is discarded only once the new one has been built, so a failed
    /// call leaves the manager as it was.
    #[instrument(skip_all, name = "evolve", fields(size = size))]
    pub fn evolve(
        &mut self,
        seed_text: &str,
        size: usize,
        target_weights: Option<FitnessWeights>,
        reporter: &ProgressReporter,
    ) -> Result<EvolutionOutcome, EngineError> {
        check_size(size)?;
        let weights = target_weights.unwrap_or(self.config.scoring.weights);
        weights
            .validate()
            .map_err(|e| ConfigError::InvalidParameter {
                name: "target_weights",
                reason: e.to_string(),
            })?;

        let molecule = self.adapter.parse(seed_text)?;
        info!(seed = molecule.canonical(), "Starting a new evolution run.");
        let seed_fingerprint = Fingerprint::of(&molecule);
        let seed = Variant::seed(molecule, &weights);

        let report = self.populate(&seed, size, &seed_fingerprint, &weights, reporter)?;

        let seed_stats = GenerationStats::collect(std::slice::from_ref(&seed), 1, std::iter::empty());
        let stats = GenerationStats::collect(
            &report.variants,
            report.requested,
            [seed.molecule.canonical()],
        );
        let origin = Generation::new(0, vec![seed], seed_stats);
        origin.select(VariantId::SEED);
        let first = Generation::new(1, report.variants, stats);

        if let Some(previous) = self.lineage.take() {
            info!(
                generations = previous.generations.len(),
                "Discarding the previous lineage."
            );
        }
        self.lineage = Some(Lineage {
            generations: vec![Arc::new(origin), Arc::new(first)],
            seed_fingerprint,
            weights,
        });
        self.awaiting_selection.store(false, Ordering::SeqCst);
        Ok(self.outcome())
    }

    /// Resolves a seed through `catalog` and starts a new run from it.
    pub fn evolve_from_catalog(
        &mut self,
        catalog: &SeedCatalog,
        disease: &str,
        seed_index: usize,
        size: usize,
        target_weights: Option<FitnessWeights>,
        reporter: &ProgressReporter,
    ) -> Result<EvolutionOutcome, EngineError> {
        let seeds = catalog
            .seeds(disease)
            .ok_or_else(|| EngineError::UnknownTarget {
                name: disease.to_string(),
            })?;
        let seed = seeds
            .get(seed_index)
            .ok_or_else(|| EngineError::UnknownTarget {
                name: format!(
                    "{disease} (seed index {seed_index} out of range, {} seed(s) listed)",
                    seeds.len()
                ),
            })?
            .clone();
        self.evolve(&seed, size, target_weights, reporter)
    }

    /// Breeds the next generation from `selected`, which must belong to the latest
    /// generation. Any error leaves the lineage untouched.
    #[instrument(skip_all, name = "continue_evolution", fields(selected = %selected, size = size))]
    pub fn continue_evolution(
        &mut self,
        selected: VariantId,
        size: usize,
        reporter: &ProgressReporter,
    ) -> Result<EvolutionOutcome, EngineError> {
        let lineage = self
            .lineage
            .as_ref()
            .ok_or(EngineError::UnknownVariant(selected))?;
        let latest = lineage
            .generations
            .last()
            .ok_or(EngineError::UnknownVariant(selected))?;
        let parent = latest
            .variant(selected)
            .ok_or(EngineError::UnknownVariant(selected))?;
        check_size(size)?;

        let report = self.populate(
            parent,
            size,
            &lineage.seed_fingerprint,
            &lineage.weights,
            reporter,
        )?;
        let stats = GenerationStats::collect(
            &report.variants,
            report.requested,
            lineage
                .generations
                .iter()
                .flat_map(|g| g.population.iter().map(|v| v.molecule.canonical())),
        );
        let latest = Arc::clone(latest);
        let next = Generation::new(latest.index + 1, report.variants, stats);

        latest.select(selected);
        info!(selected = %selected, generation = next.index, "Selection recorded.");
        if let Some(lineage) = self.lineage.as_mut() {
            lineage.generations.push(Arc::new(next));
        }
        self.awaiting_selection.store(false, Ordering::SeqCst);
        Ok(self.outcome())
    }

    /// The ancestor chain of `id`, starting with the variant itself and ending with the
    /// generation-0 seed. Ids of any generation are accepted.
    pub fn lineage(&self, id: VariantId) -> Result<Vec<VariantSummary>, EngineError> {
        let lineage = self
            .lineage
            .as_ref()
            .ok_or(EngineError::UnknownVariant(id))?;
        let find = |id: VariantId| {
            lineage
                .generations
                .get(id.generation)
                .and_then(|g| g.variant(id))
        };

        let mut chain = Vec::new();
        let mut current = Some(find(id).ok_or(EngineError::UnknownVariant(id))?);
        while let Some(variant) = current {
            chain.push(VariantSummary::from(variant));
            current = variant.parent_id.and_then(find);
        }
        Ok(chain)
    }

    /// The configured top-K of the latest generation, best first. Reading them moves
    /// the manager to [`EvolutionState::AwaitingSelection`].
    pub fn top_candidates(&self) -> Vec<VariantSummary> {
        if self.lineage.is_some() {
            self.awaiting_selection.store(true, Ordering::SeqCst);
        }
        self.ranked_top_k()
    }

    fn ranked_top_k(&self) -> Vec<VariantSummary> {
        let Some(latest) = self.latest_generation() else {
            return Vec::new();
        };
        ranking::top_k(&latest.population, self.config.selection.top_k)
            .into_iter()
            .map(VariantSummary::from)
            .collect()
    }

    /// Leaves the state at [`EvolutionState::Populated`]; only an explicit
    /// [`Self::top_candidates`] call marks the generation as inspected.
    fn outcome(&self) -> EvolutionOutcome {
        let top_candidates = self.ranked_top_k();
        let (generation_index, stats) = self
            .latest_generation()
            .map(|g| (g.index, g.stats.clone()))
            .unwrap_or_default();
        info!(
            generation = generation_index,
            produced = stats.produced,
            best = ?stats.best_score,
            "Generation ready for selection."
        );
        EvolutionOutcome {
            generation_index,
            top_candidates,
            stats,
        }
    }

    fn populate(
        &self,
        parent: &Variant,
        size: usize,
        seed_fingerprint: &Fingerprint,
        weights: &FitnessWeights,
        reporter: &ProgressReporter,
    ) -> Result<PopulationReport, EngineError> {
        let context = PopulationContext::new(
            &self.adapter,
            &self.config,
            seed_fingerprint,
            self.run_seed,
            &self.cancel,
            reporter,
        )
        .with_weights(weights);

        let result = generate_population(parent, size, &context);
        if let Err(EngineError::Cancelled) = &result {
            // The cancellation has been honoured; clear it for the next call.
            self.cancel.reset();
            reporter.report(Progress::Message("Population run cancelled.".into()));
        }
        result
    }
}

fn check_size(size: usize) -> Result<(), ConfigError> {
    if size == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "population_size",
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

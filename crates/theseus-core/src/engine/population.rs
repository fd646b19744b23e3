use super::context::PopulationContext;
use super::error::EngineError;
use super::mutation::{Candidate, MutationEngine};
use super::progress::Progress;
use super::state::{Variant, VariantId};
use crate::core::descriptors::{self, Descriptors};
use crate::core::fingerprint::Fingerprint;
use crate::core::io::traits::StructureAdapter;
use crate::core::scoring::{self, FitnessResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The outcome of one population run. `dropped` slots exhausted their retries.
#[derive(Debug, Clone)]
pub struct PopulationReport {
    pub variants: Vec<Variant>,
    pub requested: usize,
    pub dropped: usize,
}

struct ScoredCandidate {
    candidate: Candidate,
    descriptors: Descriptors,
    fitness: FitnessResult,
    similarity: f64,
}

/// Mutates `parent` into up to `size` scored variants of the next generation.
///
/// Slots are independent: each has its own RNG derived from the run seed, the
/// generation and the slot number, so the result does not depend on scheduling.
/// Slots that exhaust their retries are dropped and counted in the report.
#[instrument(skip_all, name = "generate_population", fields(generation = parent.generation() + 1, size = size))]
pub fn generate_population<A>(
    parent: &Variant,
    size: usize,
    context: &PopulationContext<'_, A>,
) -> Result<PopulationReport, EngineError>
where
    A: StructureAdapter + Sync,
{
    let generation = parent.generation() + 1;
    let config = context.config;
    let engine = MutationEngine::new(
        context.adapter,
        &config.mutation.vocabulary,
        config.mutation.max_retries,
    )
    .with_cancellation(context.cancel);

    context.reporter.report(Progress::PhaseStart {
        name: "Generating population",
    });
    context.reporter.report(Progress::TaskStart {
        total_steps: size as u64,
    });

    let slots = 0..size;

    #[cfg(not(feature = "parallel"))]
    let iterator = slots;

    #[cfg(feature = "parallel")]
    let iterator = slots.into_par_iter();

    let outcomes: Vec<Option<ScoredCandidate>> = iterator
        .map(|slot| {
            let outcome = run_slot(&engine, parent, generation, slot, context);
            context.reporter.report(Progress::TaskIncrement);
            outcome
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);
    context.reporter.report(Progress::PhaseFinish);

    if context.cancel.is_cancelled() {
        info!(generation, "Population run cancelled; discarding completed slots.");
        return Err(EngineError::Cancelled);
    }

    let threshold = config.selection.nce_similarity_threshold;
    let variants: Vec<Variant> = outcomes
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(index, scored)| Variant {
            id: VariantId::new(generation, index),
            molecule: scored.candidate.molecule,
            parent_id: Some(parent.id),
            cumulative_mutation_count: parent.cumulative_mutation_count
                + scored.candidate.edits.len(),
            mutations_this_step: scored.candidate.edits,
            descriptors: scored.descriptors,
            fitness: scored.fitness,
            similarity_to_seed: scored.similarity,
            novel_entity: scored.similarity < threshold,
        })
        .collect();

    let dropped = size - variants.len();
    if variants.is_empty() {
        return Err(EngineError::EmptyPopulation {
            generation,
            requested: size,
        });
    }

    info!(
        generation,
        produced = variants.len(),
        dropped,
        "Population generated."
    );
    Ok(PopulationReport {
        variants,
        requested: size,
        dropped,
    })
}

fn run_slot<A>(
    engine: &MutationEngine<'_, A>,
    parent: &Variant,
    generation: usize,
    slot: usize,
    context: &PopulationContext<'_, A>,
) -> Option<ScoredCandidate>
where
    A: StructureAdapter + Sync,
{
    if context.cancel.is_cancelled() {
        return None;
    }
    let mut rng = StdRng::seed_from_u64(slot_seed(context.run_seed, generation, slot));
    let edit_count = rng.gen_range(context.config.mutation.edit_range());

    let candidate = match engine.mutate(&parent.molecule, edit_count, &mut rng) {
        Ok(candidate) => candidate,
        Err(exhausted) => {
            debug!(slot, attempts = exhausted.attempts, "Dropping population slot.");
            return None;
        }
    };

    let descriptors = descriptors::describe(&candidate.molecule);
    let fitness = scoring::score(&descriptors, context.weights);
    let similarity = Fingerprint::of(&candidate.molecule).tanimoto(context.seed_fingerprint);
    Some(ScoredCandidate {
        candidate,
        descriptors,
        fitness,
        similarity,
    })
}

/// Derives an independent RNG seed for one slot of one generation.
pub(crate) fn slot_seed(run_seed: u64, generation: usize, slot: usize) -> u64 {
    let generation_seed = splitmix64(run_seed ^ splitmix64(generation as u64));
    splitmix64(generation_seed ^ slot as u64)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

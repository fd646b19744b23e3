use super::config::EvolutionConfig;
use super::progress::{CancellationToken, ProgressReporter};
use crate::core::fingerprint::Fingerprint;
use crate::core::io::traits::StructureAdapter;
use crate::core::scoring::FitnessWeights;

/// Everything a population run reads but never modifies.
#[derive(Clone, Copy)]
pub struct PopulationContext<'a, A>
where
    A: StructureAdapter + Sync,
{
    pub adapter: &'a A,
    pub config: &'a EvolutionConfig,
    pub weights: &'a FitnessWeights,
    pub seed_fingerprint: &'a Fingerprint,
    pub run_seed: u64,
    pub cancel: &'a CancellationToken,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a, A> PopulationContext<'a, A>
where
    A: StructureAdapter + Sync,
{
    pub fn new(
        adapter: &'a A,
        config: &'a EvolutionConfig,
        seed_fingerprint: &'a Fingerprint,
        run_seed: u64,
        cancel: &'a CancellationToken,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            adapter,
            config,
            weights: &config.scoring.weights,
            seed_fingerprint,
            run_seed,
            cancel,
            reporter,
        }
    }

    /// Scores with `weights` instead of the configured ones.
    pub fn with_weights(mut self, weights: &'a FitnessWeights) -> Self {
        self.weights = weights;
        self
    }
}

use theseus::engine::config::EvolutionConfig;

pub struct DefaultsConfig {
    pub population_size: usize,
    pub generations: usize,
    pub min_edits: usize,
    pub max_edits: usize,
    pub max_retries: usize,
    pub vocabulary: Vec<String>,
    pub rule_weight: f64,
    pub bioavailability_weight: f64,
    pub top_k: usize,
    pub nce_threshold: f64,
    pub max_fragments: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let core = EvolutionConfig::default();
        Self {
            population_size: core.population_size,
            generations: 5,
            min_edits: core.mutation.edit_count_min,
            max_edits: core.mutation.edit_count_max,
            max_retries: core.mutation.max_retries,
            vocabulary: core
                .mutation
                .vocabulary
                .iter()
                .map(|e| e.symbol().to_string())
                .collect(),
            rule_weight: core.scoring.weights.rule_of_five,
            bioavailability_weight: core.scoring.weights.bioavailability,
            top_k: core.selection.top_k,
            nce_threshold: core.selection.nce_similarity_threshold,
            max_fragments: core.structure.max_fragments,
        }
    }
}

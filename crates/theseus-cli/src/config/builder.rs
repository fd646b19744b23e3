use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::EvolveArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use theseus::core::models::element::Element;
use theseus::core::scoring::FitnessWeights;
use theseus::engine::config::EvolutionConfigBuilder;

pub fn build_config(args: &EvolveArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let population_file = file_config.population.take().unwrap_or_default();
    let population_size = args
        .population_size
        .or(population_file.size)
        .unwrap_or(defaults.population_size);
    let generations = args
        .generations
        .or(population_file.generations)
        .unwrap_or(defaults.generations);
    if generations == 0 {
        return Err(CliError::Config(
            "`population.generations` must be at least 1".to_string(),
        ));
    }

    let mutation_file = file_config.mutation.take().unwrap_or_default();
    let vocabulary = match (&args.vocabulary, mutation_file.vocabulary) {
        (Some(cli), _) => parser::parse_vocabulary(cli)
            .map_err(|e| CliError::Argument(e.to_string()))?,
        (None, Some(symbols)) => resolve_symbols(&symbols)?,
        (None, None) => resolve_symbols(&defaults.vocabulary)?,
    };
    let min_edits = args
        .min_edits
        .or(mutation_file.min_edits)
        .unwrap_or(defaults.min_edits);
    let max_edits = args
        .max_edits
        .or(mutation_file.max_edits)
        .unwrap_or(defaults.max_edits);
    let max_retries = args
        .max_retries
        .or(mutation_file.max_retries)
        .unwrap_or(defaults.max_retries);

    let scoring_file = file_config.scoring.take().unwrap_or_default();
    let weights = FitnessWeights {
        rule_of_five: args
            .rule_weight
            .or(scoring_file.rule_weight)
            .unwrap_or(defaults.rule_weight),
        bioavailability: args
            .bio_weight
            .or(scoring_file.bioavailability_weight)
            .unwrap_or(defaults.bioavailability_weight),
    };

    let selection_file = file_config.selection.take().unwrap_or_default();
    let top_k = args
        .top_k
        .or(selection_file.top_k)
        .unwrap_or(defaults.top_k);
    let nce_threshold = selection_file
        .nce_threshold
        .unwrap_or(defaults.nce_threshold);

    let max_fragments = file_config
        .structure
        .take()
        .and_then(|s| s.max_fragments)
        .unwrap_or(defaults.max_fragments);

    let run_file = file_config.run.take().unwrap_or_default();
    let rng_seed = args.rng_seed.or(run_file.seed);
    let catalog_path = args.catalog.clone().or(run_file.catalog);

    let core_config = EvolutionConfigBuilder::new()
        .vocabulary(vocabulary)
        .edit_count_min(min_edits)
        .edit_count_max(max_edits)
        .max_retries(max_retries)
        .max_fragments(max_fragments)
        .weights(weights)
        .top_k(top_k)
        .nce_similarity_threshold(nce_threshold)
        .population_size(population_size)
        .rng_seed(rng_seed)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        core_config,
        generations,
        catalog_path,
    })
}

fn resolve_symbols(symbols: &[String]) -> Result<Vec<Element>> {
    parser::parse_vocabulary(&symbols.join(",")).map_err(|e| CliError::Config(e.to_string()))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let (key, value_str) = (key.trim(), value_str.trim());

        match key {
            "population.size" => {
                config
                    .population
                    .get_or_insert_with(Default::default)
                    .size = Some(parse_value(key, value_str)?);
            }
            "population.generations" => {
                config
                    .population
                    .get_or_insert_with(Default::default)
                    .generations = Some(parse_value(key, value_str)?);
            }
            "mutation.min-edits" => {
                config
                    .mutation
                    .get_or_insert_with(Default::default)
                    .min_edits = Some(parse_value(key, value_str)?);
            }
            "mutation.max-edits" => {
                config
                    .mutation
                    .get_or_insert_with(Default::default)
                    .max_edits = Some(parse_value(key, value_str)?);
            }
            "mutation.max-retries" => {
                config
                    .mutation
                    .get_or_insert_with(Default::default)
                    .max_retries = Some(parse_value(key, value_str)?);
            }
            "mutation.vocabulary" => {
                config
                    .mutation
                    .get_or_insert_with(Default::default)
                    .vocabulary = Some(
                    value_str
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
            }
            "scoring.rule-weight" => {
                config
                    .scoring
                    .get_or_insert_with(Default::default)
                    .rule_weight = Some(parse_value(key, value_str)?);
            }
            "scoring.bioavailability-weight" => {
                config
                    .scoring
                    .get_or_insert_with(Default::default)
                    .bioavailability_weight = Some(parse_value(key, value_str)?);
            }
            "selection.top-k" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .top_k = Some(parse_value(key, value_str)?);
            }
            "selection.nce-threshold" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .nce_threshold = Some(parse_value(key, value_str)?);
            }
            "structure.max-fragments" => {
                config
                    .structure
                    .get_or_insert_with(Default::default)
                    .max_fragments = Some(parse_value(key, value_str)?);
            }
            "run.seed" => {
                config.run.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

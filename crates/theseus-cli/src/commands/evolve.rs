use crate::cli::{EvolveArgs, SelectMode};
use crate::commands::targets::load_catalog;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::parser::{self, Selection};
use crate::utils::progress::PopulationProgress;
use serde::Serialize;
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use theseus::engine::progress::ProgressReporter;
use theseus::engine::state::{GenerationStats, VariantId};
use theseus::workflows::evolve::{EvolutionOutcome, GenerationManager, VariantSummary};
use theseus::workflows::explain::{Explainer, TemplateExplainer};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct GenerationReport {
    index: usize,
    selected: Option<VariantId>,
    stats: GenerationStats,
    population: Vec<VariantSummary>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    run_seed: u64,
    generations: Vec<GenerationReport>,
    /// From the seed to the final pick.
    selection_path: Vec<VariantSummary>,
}

pub async fn run(args: EvolveArgs) -> Result<()> {
    let app = build_config(&args)?;
    let AppConfig {
        core_config,
        generations,
        catalog_path,
    } = app;
    let population_size = core_config.population_size;

    let mut manager = GenerationManager::new(core_config);
    info!(run_seed = manager.run_seed(), "Generation manager ready.");

    let token = manager.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling the current population run.");
            token.cancel();
        }
    });

    let mode = args.select.unwrap_or_else(|| {
        if std::io::stdin().is_terminal() {
            SelectMode::Prompt
        } else {
            SelectMode::Best
        }
    });

    let progress = PopulationProgress::new();
    progress.set_generation(1);
    let reporter = ProgressReporter::with_callback(progress.callback());

    let mut outcome = match (&args.seed, &args.disease) {
        (Some(seed), _) => {
            println!("Evolving seed {seed}...");
            tokio::task::block_in_place(|| manager.evolve(seed, population_size, None, &reporter))?
        }
        (None, Some(disease)) => {
            let catalog = load_catalog(catalog_path.as_deref())?;
            let seed_index = args.seed_index.unwrap_or(0);
            println!("Evolving seed {seed_index} of target '{disease}'...");
            tokio::task::block_in_place(|| {
                manager.evolve_from_catalog(
                    &catalog,
                    disease,
                    seed_index,
                    population_size,
                    None,
                    &reporter,
                )
            })?
        }
        (None, None) => {
            return Err(CliError::Argument(
                "either --seed or --disease is required".to_string(),
            ));
        }
    };

    let explainer = args.explain.then_some(TemplateExplainer);
    // The most recent selection; the selection path ends here.
    let mut pick = None;
    loop {
        print_outcome(&outcome, explainer.as_ref());

        let choice = match mode {
            SelectMode::Best => outcome.top_candidates.first().map(|c| c.id),
            SelectMode::Prompt => tokio::task::block_in_place(|| prompt_selection(&outcome.top_candidates))?,
        };
        let Some(choice) = choice else {
            info!("Selection stopped by the user.");
            break;
        };
        pick = Some(choice);
        if outcome.generation_index >= generations {
            break;
        }

        progress.set_generation(outcome.generation_index + 1);
        outcome = tokio::task::block_in_place(|| {
            manager.continue_evolution(choice, population_size, &reporter)
        })?;
    }

    if let Some(pick) = pick {
        let path = manager.lineage(pick)?;
        println!("\nSelection path ({} step(s)):", path.len().saturating_sub(1));
        for summary in path.iter().rev() {
            println!(
                "  {:<8} {:.3}  {}",
                summary.id.to_string(),
                summary.fitness.score,
                summary.structure_text
            );
        }
    }

    if let Some(report_path) = &args.report {
        write_report(&manager, pick, report_path)?;
        println!("Report written to {}", report_path.display());
    }
    Ok(())
}

fn print_outcome(outcome: &EvolutionOutcome, explainer: Option<&TemplateExplainer>) {
    let stats = &outcome.stats;
    println!(
        "\nGeneration {}: {} of {} variants ({} dropped, {} new structures, {} new entities)",
        outcome.generation_index,
        stats.produced,
        stats.requested,
        stats.dropped,
        stats.first_seen_structures,
        stats.novel_entities
    );
    print!("{}", format_table(&outcome.top_candidates));

    if let Some(explainer) = explainer {
        for candidate in &outcome.top_candidates {
            match explainer.explain(candidate) {
                Ok(text) => println!("\n{text}"),
                Err(e) => warn!("No explanation for {}: {}", candidate.id, e),
            }
        }
    }
}

fn format_table(candidates: &[VariantSummary]) -> String {
    let mut out = format!(
        "{:>4}  {:<8} {:>6} {:>8} {:>6} {:>7}  {:<5} {}\n",
        "rank", "id", "score", "MW", "logP", "TPSA", "flags", "structure"
    );
    for (rank, c) in candidates.iter().enumerate() {
        let f = &c.fitness;
        let flags: String = [
            (f.rule_of_five_compliant, 'R'),
            (f.barrier_penetrant, 'B'),
            (f.oral_bioavailable, 'O'),
            (f.toxicity_risk, 'T'),
            (c.novel_entity, 'N'),
        ]
        .iter()
        .map(|&(set, letter)| if set { letter } else { '.' })
        .collect();
        let optional = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        out.push_str(&format!(
            "{:>4}  {:<8} {:>6.3} {:>8.2} {:>6} {:>7}  {:<5} {}\n",
            rank + 1,
            c.id.to_string(),
            f.score,
            c.descriptors.molecular_weight,
            optional(c.descriptors.logp),
            optional(c.descriptors.tpsa),
            flags,
            c.structure_text
        ));
    }
    out
}

fn prompt_selection(candidates: &[VariantSummary]) -> Result<Option<VariantId>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    read_selection(candidates, &mut input, &mut stdout)
}

/// Asks until the reply names a listed candidate or stops. End of input stops.
fn read_selection(
    candidates: &[VariantSummary],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Option<VariantId>> {
    if candidates.is_empty() {
        return Ok(None);
    }
    loop {
        write!(
            output,
            "Select a parent [1-{}, variant id, q to stop]: ",
            candidates.len()
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parser::parse_selection(&line, candidates) {
            Ok(Selection::Variant(id)) => return Ok(Some(id)),
            Ok(Selection::Stop) => return Ok(None),
            Err(e) => writeln!(output, "{e}")?,
        }
    }
}

fn write_report<A>(
    manager: &GenerationManager<A>,
    pick: Option<VariantId>,
    path: &Path,
) -> Result<()>
where
    A: theseus::core::io::traits::StructureAdapter + Sync,
{
    let generations = manager
        .snapshot()
        .iter()
        .map(|g| GenerationReport {
            index: g.index,
            selected: g.selected(),
            stats: g.stats.clone(),
            population: g.population.iter().map(VariantSummary::from).collect(),
        })
        .collect();
    let mut selection_path = match pick {
        Some(id) => manager.lineage(id)?,
        None => Vec::new(),
    };
    selection_path.reverse();

    let report = RunReport {
        run_seed: manager.run_seed(),
        generations,
        selection_path,
    };
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use theseus::engine::config::EvolutionConfigBuilder;

    fn evolved_manager() -> (GenerationManager, EvolutionOutcome) {
        let config = EvolutionConfigBuilder::new()
            .population_size(12)
            .rng_seed(Some(31))
            .build()
            .unwrap();
        let mut manager = GenerationManager::new(config);
        let outcome = manager
            .evolve("CC(=O)Nc1ccc(O)cc1", 12, None, &ProgressReporter::new())
            .unwrap();
        (manager, outcome)
    }

    #[test]
    fn table_lists_every_candidate_in_rank_order() {
        let (_, outcome) = evolved_manager();
        let table = format_table(&outcome.top_candidates);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), outcome.top_candidates.len() + 1);
        assert!(lines[0].contains("score"));
        assert!(lines[1].trim_start().starts_with("1  "));
        assert!(lines[1].contains(&outcome.top_candidates[0].structure_text));
    }

    #[test]
    fn prompt_retries_until_a_valid_choice() {
        let (_, outcome) = evolved_manager();
        let mut input = Cursor::new("zzz\n99\n1\n");
        let mut output = Vec::new();
        let choice = read_selection(&outcome.top_candidates, &mut input, &mut output).unwrap();
        assert_eq!(choice, Some(outcome.top_candidates[0].id));
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("Select a parent").count(), 3);
        assert!(printed.contains("out of range"));
    }

    #[test]
    fn prompt_stops_on_quit_or_end_of_input() {
        let (_, outcome) = evolved_manager();
        let mut output = Vec::new();
        assert_eq!(
            read_selection(&outcome.top_candidates, &mut Cursor::new("q\n"), &mut output).unwrap(),
            None
        );
        assert_eq!(
            read_selection(&outcome.top_candidates, &mut Cursor::new(""), &mut output).unwrap(),
            None
        );
    }

    #[test]
    fn report_contains_generations_and_the_selection_path() {
        let (mut manager, outcome) = evolved_manager();
        let pick = outcome.top_candidates[0].id;
        let next = manager
            .continue_evolution(pick, 12, &ProgressReporter::new())
            .unwrap();
        let last = next.top_candidates[0].id;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&manager, Some(last), &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let generations = json["generations"].as_array().unwrap();
        assert_eq!(generations.len(), 3);
        assert_eq!(generations[0]["selected"], "g0-0");
        assert_eq!(generations[1]["selected"], pick.to_string());
        assert!(generations[2]["selected"].is_null());

        let path = json["selection_path"].as_array().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0]["id"], "g0-0");
        assert_eq!(path[2]["id"], last.to_string());
    }
}

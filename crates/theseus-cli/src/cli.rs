use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The Theseus Developers",
    version,
    about = "Theseus CLI - Evolve small molecules through randomized atom-level edits, scored by drug-likeness heuristics and steered by your selections.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for population generation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evolve a seed structure over several generations, selecting a parent each round.
    Evolve(EvolveArgs),
    /// Print canonical notation, descriptors and fitness for one or more structures.
    Describe(DescribeArgs),
    /// List the diseases of the seed catalog.
    Targets(TargetsArgs),
}

/// How the parent of the next generation is chosen.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Ask after every generation.
    Prompt,
    /// Always continue from the best-ranked candidate.
    Best,
}

/// Arguments for the `evolve` subcommand.
#[derive(Args, Debug, Default)]
pub struct EvolveArgs {
    // --- Seed ---
    /// Seed structure in SMILES notation (e.g., 'CC(=O)Oc1ccccc1C(=O)O').
    #[arg(short, long, value_name = "SMILES", required_unless_present = "disease", conflicts_with = "disease")]
    pub seed: Option<String>,

    /// Take the seed from the catalog entry of this disease (e.g., 'malaria').
    #[arg(short, long, value_name = "NAME")]
    pub disease: Option<String>,

    /// Which of the disease's seeds to use, counting from 0 [default: 0].
    #[arg(long, value_name = "INT", requires = "disease")]
    pub seed_index: Option<usize>,

    /// Path to a seed catalog in TOML format, replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    // --- Run Control ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of variants requested per generation.
    #[arg(short = 'n', long, value_name = "INT")]
    pub population_size: Option<usize>,

    /// Number of generations to breed before stopping.
    #[arg(short, long, value_name = "INT")]
    pub generations: Option<usize>,

    /// Parent selection mode. Defaults to 'prompt' on a terminal and 'best' otherwise.
    #[arg(long, value_enum)]
    pub select: Option<SelectMode>,

    /// Number of ranked candidates shown per generation.
    #[arg(short = 'k', long, value_name = "INT")]
    pub top_k: Option<usize>,

    /// Fixed seed for reproducible runs.
    #[arg(long, value_name = "INT")]
    pub rng_seed: Option<u64>,

    // --- Mutation Overrides ---
    /// Comma-separated element symbols an edit may add (e.g., 'C,N,O').
    #[arg(long, value_name = "SYMBOLS")]
    pub vocabulary: Option<String>,

    /// Fewest edits applied per variant.
    #[arg(long, value_name = "INT")]
    pub min_edits: Option<usize>,

    /// Most edits applied per variant.
    #[arg(long, value_name = "INT")]
    pub max_edits: Option<usize>,

    /// Attempts per variant before its slot is dropped.
    #[arg(long, value_name = "INT")]
    pub max_retries: Option<usize>,

    // --- Scoring Overrides ---
    /// Weight of the rule-of-five factor in the composite score.
    #[arg(long, value_name = "FLOAT")]
    pub rule_weight: Option<f64>,

    /// Weight of the bioavailability factor in the composite score.
    #[arg(long, value_name = "FLOAT")]
    pub bio_weight: Option<f64>,

    // --- Output ---
    /// Print a plain-language explanation for every ranked candidate.
    #[arg(long)]
    pub explain: bool,

    /// Write a JSON report of every generation and the selection path.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S selection.top-k=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Structures in SMILES notation.
    #[arg(required = true, value_name = "SMILES")]
    pub structures: Vec<String>,

    /// Print machine-readable JSON instead of a text summary.
    #[arg(long)]
    pub json: bool,

    /// Accept structures with up to this many disconnected fragments.
    #[arg(long, value_name = "INT", default_value_t = 1)]
    pub max_fragments: usize,
}

/// Arguments for the `targets` subcommand.
#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Path to a seed catalog in TOML format, replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Also print every seed structure.
    #[arg(long)]
    pub seeds: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evolve_requires_a_seed_or_a_disease() {
        assert!(Cli::try_parse_from(["theseus", "evolve"]).is_err());
        assert!(
            Cli::try_parse_from(["theseus", "evolve", "--seed", "CCO", "--disease", "flu"])
                .is_err()
        );
    }

    #[test]
    fn seed_index_is_only_accepted_with_a_disease() {
        assert!(
            Cli::try_parse_from(["theseus", "evolve", "--seed", "CCO", "--seed-index", "2"])
                .is_err()
        );

        let cli = Cli::try_parse_from(["theseus", "evolve", "--disease", "malaria"]).unwrap();
        let Commands::Evolve(args) = cli.command else {
            panic!("Expected 'evolve' subcommand");
        };
        assert_eq!(args.seed_index, None);
    }

    #[test]
    fn evolve_parses_overrides_and_repeated_set_values() {
        let cli = Cli::try_parse_from([
            "theseus",
            "-vv",
            "evolve",
            "-d",
            "malaria",
            "--seed-index",
            "2",
            "-n",
            "50",
            "--select",
            "best",
            "-S",
            "selection.top-k=3",
            "-S",
            "run.seed=7",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Evolve(args) = cli.command else {
            panic!("Expected 'evolve' subcommand");
        };
        assert_eq!(args.disease.as_deref(), Some("malaria"));
        assert_eq!(args.seed_index, Some(2));
        assert_eq!(args.population_size, Some(50));
        assert_eq!(args.select, Some(SelectMode::Best));
        assert_eq!(args.set_values.len(), 2);
    }

    #[test]
    fn describe_takes_several_structures() {
        let cli = Cli::try_parse_from(["theseus", "describe", "CCO", "c1ccccc1", "--json"]).unwrap();
        let Commands::Describe(args) = cli.command else {
            panic!("Expected 'describe' subcommand");
        };
        assert_eq!(args.structures, vec!["CCO", "c1ccccc1"]);
        assert!(args.json);
        assert_eq!(args.max_fragments, 1);
    }
}

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub population: Option<FilePopulationConfig>,
    pub mutation: Option<FileMutationConfig>,
    pub scoring: Option<FileScoringConfig>,
    pub selection: Option<FileSelectionConfig>,
    pub structure: Option<FileStructureConfig>,
    pub run: Option<FileRunConfig>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePopulationConfig {
    pub size: Option<usize>,
    pub generations: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileMutationConfig {
    pub vocabulary: Option<Vec<String>>,
    pub min_edits: Option<usize>,
    pub max_edits: Option<usize>,
    pub max_retries: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileScoringConfig {
    pub rule_weight: Option<f64>,
    pub bioavailability_weight: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSelectionConfig {
    pub top_k: Option<usize>,
    pub nce_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileStructureConfig {
    pub max_fragments: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRunConfig {
    pub seed: Option<u64>,
    pub catalog: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn from_file_reads_kebab_case_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("theseus.toml");
        fs::write(
            &path,
            r#"
            [population]
            size = 40
            generations = 3

            [mutation]
            vocabulary = ["C", "N", "Cl"]
            min-edits = 2
            max-edits = 4

            [scoring]
            rule-weight = 0.5
            bioavailability-weight = 0.5

            [run]
            seed = 17
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        let population = config.population.unwrap();
        assert_eq!(population.size, Some(40));
        assert_eq!(population.generations, Some(3));
        let mutation = config.mutation.unwrap();
        assert_eq!(mutation.vocabulary.unwrap(), vec!["C", "N", "Cl"]);
        assert_eq!(mutation.min_edits, Some(2));
        assert_eq!(mutation.max_retries, None);
        assert_eq!(config.scoring.unwrap().rule_weight, Some(0.5));
        assert_eq!(config.run.unwrap().seed, Some(17));
        assert!(config.selection.is_none());
    }

    #[test]
    fn from_file_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[mutation]\nmin_edits = 2\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn from_file_reports_missing_files_as_parse_errors() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}

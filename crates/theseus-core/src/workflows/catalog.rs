use crate::core::io::error::StructureError;
use crate::core::io::traits::StructureAdapter;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Seed {index} of target '{disease}' is not a valid structure: {source}")]
    InvalidSeed {
        disease: String,
        index: usize,
        source: StructureError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    targets: BTreeMap<String, Vec<String>>,
}

/// Maps disease names to seed structures.
///
/// The catalog is handed to the evolution entry points by the caller; the engine
/// keeps no built-in table. Names are stored and looked up in lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedCatalog {
    targets: BTreeMap<String, Vec<String>>,
}

impl SeedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a catalog file of the form
    ///
    /// ```toml
    /// [targets]
    /// malaria = ["COc1ccc2nccc(C(O)C3CC4CCN3CC4C=C)c2c1"]
    /// ```
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| CatalogLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(content)?;
        Ok(file.targets.into_iter().collect())
    }

    /// Adds seeds for a disease, appending to any seeds already listed under that name.
    pub fn insert(&mut self, disease: &str, seeds: impl IntoIterator<Item = String>) {
        self.targets
            .entry(normalize(disease))
            .or_default()
            .extend(seeds);
    }

    pub fn seeds(&self, disease: &str) -> Option<&[String]> {
        self.targets.get(&normalize(disease)).map(Vec::as_slice)
    }

    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.targets
            .iter()
            .map(|(name, seeds)| (name.as_str(), seeds.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Checks that every seed parses with `adapter`, reporting the first failure.
    pub fn validate<A: StructureAdapter>(&self, adapter: &A) -> Result<(), CatalogLoadError> {
        for (disease, seeds) in &self.targets {
            for (index, seed) in seeds.iter().enumerate() {
                adapter
                    .parse(seed)
                    .map_err(|source| CatalogLoadError::InvalidSeed {
                        disease: disease.clone(),
                        index,
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

impl<S: AsRef<str>> FromIterator<(S, Vec<String>)> for SeedCatalog {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (disease, seeds) in iter {
            catalog.insert(disease.as_ref(), seeds);
        }
        catalog
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

use crate::cli::TargetsArgs;
use crate::error::Result;
use std::path::Path;
use theseus::engine::error::EngineError;
use theseus::workflows::catalog::{CatalogLoadError, SeedCatalog};
use tracing::info;

const BUILTIN_CATALOG: &str = include_str!("../../data/targets.toml");

/// Loads the catalog at `path`, or the one compiled into the binary.
pub fn load_catalog(path: Option<&Path>) -> Result<SeedCatalog> {
    let catalog = match path {
        Some(path) => {
            info!("Loading seed catalog from {:?}", path);
            SeedCatalog::load(path).map_err(EngineError::from)?
        }
        None => SeedCatalog::from_toml_str(BUILTIN_CATALOG).map_err(|source| {
            EngineError::from(CatalogLoadError::Toml {
                path: "<built-in>".to_string(),
                source,
            })
        })?,
    };
    Ok(catalog)
}

pub async fn run(args: TargetsArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    print!("{}", render(&catalog, args.seeds));
    Ok(())
}

fn render(catalog: &SeedCatalog, with_seeds: bool) -> String {
    let mut out = String::new();
    for (disease, seeds) in catalog.iter() {
        out.push_str(&format!("{disease:<16} {} seed(s)\n", seeds.len()));
        if with_seeds {
            for (index, seed) in seeds.iter().enumerate() {
                out.push_str(&format!("  [{index}] {seed}\n"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use theseus::core::io::smiles::SmilesAdapter;

    #[test]
    fn builtin_catalog_loads_and_every_seed_parses() {
        let catalog = load_catalog(None).unwrap();
        let diseases: Vec<_> = catalog.diseases().collect();
        assert_eq!(
            diseases,
            vec!["alzheimer", "cancer", "diabetes", "influenza", "malaria"]
        );
        assert!(catalog.iter().all(|(_, seeds)| seeds.len() == 5));
        catalog.validate(&SmilesAdapter::default()).unwrap();
    }

    #[test]
    fn missing_catalog_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_catalog(Some(&dir.path().join("none.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn render_lists_counts_and_optionally_seeds() {
        let catalog: SeedCatalog = [("flu", vec!["CCO".to_string()])].into_iter().collect();
        assert_eq!(render(&catalog, false), format!("{:<16} 1 seed(s)\n", "flu"));
        assert!(render(&catalog, true).contains("  [0] CCO"));
    }
}

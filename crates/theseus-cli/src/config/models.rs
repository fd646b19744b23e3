use std::path::PathBuf;
use theseus::engine::config::EvolutionConfig;

pub struct AppConfig {
    pub core_config: EvolutionConfig,
    pub generations: usize,
    pub catalog_path: Option<PathBuf>,
}

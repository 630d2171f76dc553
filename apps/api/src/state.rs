use crate::config::Config;
use crate::screening::pipeline::RankingOptions;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only: ranking runs never share mutable state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub ranking: RankingOptions,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let ranking = config.ranking_options();
        Self { config, ranking }
    }
}

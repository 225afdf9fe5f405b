use crate::config::AppConfig;
use crate::letters::LetterService;

/// Shared application state handed to every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub letters: LetterService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let letters = LetterService::new(config.banner_fallback());
        Self { config, letters }
    }
}

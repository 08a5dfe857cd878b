//! Application state: the therapy store, AAC board pool, builtin dictionary,
//! optional language provider, and the shared translation cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::aac::BoardPool;
use crate::config::{datasets_from_env, load_config_from_env};
use crate::datasets::DatasetRegistry;
use crate::domain::Translations;
use crate::provider::LanguageProvider;
use crate::seeds;
use crate::store::TherapyStore;

pub struct AppState {
    pub store: TherapyStore,
    pub provider: Option<LanguageProvider>,
    pub board: BoardPool,
    pub dictionary: HashMap<String, Translations>,
    pub datasets: DatasetRegistry,
    /// (lowercased text, target language) -> translation. Reduces provider
    /// hits for repeated tiles and instructions.
    pub translation_cache: RwLock<HashMap<(String, String), String>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state from env: load config, rehydrate the store, build the
    /// board pool, init the optional provider.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env();

        let store = TherapyStore::load();
        let board = BoardPool::from_config(cfg.as_ref().and_then(|c| c.board.as_ref()));

        // Dataset inventory: TOML config wins, then SAARTHI_DATASETS, then
        // the builtin demo sets.
        let mut dataset_cfgs = cfg.map(|c| c.datasets).unwrap_or_default();
        if dataset_cfgs.is_empty() {
            dataset_cfgs = datasets_from_env();
        }
        if dataset_cfgs.is_empty() {
            dataset_cfgs = seeds::default_datasets();
        }
        let datasets = DatasetRegistry::new(dataset_cfgs);

        let provider = LanguageProvider::from_env();
        if let Some(p) = &provider {
            info!(target: "saarthi_backend", base_url = %p.base_url, "Language provider enabled.");
        } else {
            info!(target: "saarthi_backend", "Language provider disabled (no SAARTHI_PROVIDER_URL). Using builtin dictionary.");
        }

        let state = AppState {
            store,
            provider,
            board,
            dictionary: seeds::builtin_dictionary(),
            datasets,
            translation_cache: RwLock::new(HashMap::new()),
            started_at: Utc::now(),
        };
        state
    }

    /// Log the startup inventory the way the dashboards will see it.
    pub async fn log_inventory(&self) {
        let data = self.store.read().await;
        info!(
            target: "therapy_store",
            learners = data.learners.len(),
            activities = data.activities.len(),
            assignments = data.assignments.len(),
            board_concepts = self.board.concept_count(),
            datasets = self.datasets.len(),
            "Startup inventory"
        );
    }

    /// Whole seconds since the process built its state.
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}

//! Dataset inventory with cached samples and periodic refresh.
//!
//! Each configured dataset is either remote (a `source_url` serving a JSON
//! array of rows) or one of the builtin demo sets. A refresh pulls up to
//! `SAMPLE_SIZE` rows into the cache and stamps the metadata; failures
//! mark the entry `error` with the message and keep the service running.
//! The background task in `main` refreshes everything on an interval.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::DatasetCfg;
use crate::seeds;

pub const SAMPLE_SIZE: usize = 200;
pub const DEFAULT_SAMPLE_LIMIT: usize = 25;

#[derive(Clone, Debug, Serialize)]
pub struct DatasetMeta {
    pub name: String,
    pub status: String,
    pub sample_count_cached: u64,
    pub last_refreshed_utc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatasetMeta {
    fn not_loaded(name: &str) -> Self {
        DatasetMeta {
            name: name.to_string(),
            status: "not_loaded".into(),
            sample_count_cached: 0,
            last_refreshed_utc: None,
            error: None,
        }
    }
}

struct Entry {
    meta: DatasetMeta,
    rows: Vec<serde_json::Value>,
}

pub struct DatasetRegistry {
    configs: Vec<DatasetCfg>,
    entries: RwLock<HashMap<String, Entry>>,
    client: Option<reqwest::Client>,
}

impl DatasetRegistry {
    pub fn new(configs: Vec<DatasetCfg>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .ok();
        DatasetRegistry { configs, entries: RwLock::new(HashMap::new()), client }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    fn config(&self, name: &str) -> Option<&DatasetCfg> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Inventory in config order. Datasets never refreshed report
    /// `not_loaded` with a zero count instead of being omitted.
    pub async fn list(&self) -> Vec<DatasetMeta> {
        let entries = self.entries.read().await;
        self.configs
            .iter()
            .map(|c| {
                entries
                    .get(&c.name)
                    .map(|e| e.meta.clone())
                    .unwrap_or_else(|| DatasetMeta::not_loaded(&c.name))
            })
            .collect()
    }

    /// Re-pull one dataset's sample cache. None when the name is not in
    /// the inventory at all.
    #[instrument(level = "info", skip(self))]
    pub async fn refresh_one(&self, name: &str) -> Option<DatasetMeta> {
        let cfg = self.config(name)?.clone();
        let loaded = match &cfg.source_url {
            Some(url) => self.fetch_rows(url).await,
            None => seeds::demo_dataset_rows(name)
                .ok_or_else(|| format!("no source configured for '{}'", name)),
        };

        let (meta, rows) = match loaded {
            Ok(mut rows) => {
                rows.truncate(SAMPLE_SIZE);
                let meta = DatasetMeta {
                    name: cfg.name.clone(),
                    status: "ready".into(),
                    sample_count_cached: rows.len() as u64,
                    last_refreshed_utc: Some(Utc::now().to_rfc3339()),
                    error: None,
                };
                info!(target: "datasets", dataset = %cfg.name, rows = rows.len(), "Dataset refreshed");
                (meta, rows)
            }
            Err(e) => {
                warn!(target: "datasets", dataset = %cfg.name, error = %e, "Dataset refresh failed");
                let meta = DatasetMeta {
                    name: cfg.name.clone(),
                    status: "error".into(),
                    sample_count_cached: 0,
                    last_refreshed_utc: None,
                    error: Some(e),
                };
                (meta, vec![])
            }
        };

        let out = meta.clone();
        self.entries.write().await.insert(cfg.name, Entry { meta, rows });
        Some(out)
    }

    pub async fn refresh_all(&self) {
        for cfg in &self.configs {
            self.refresh_one(&cfg.name).await;
        }
    }

    /// Cached sample rows, refreshing on first access. None for names
    /// outside the inventory.
    pub async fn samples(&self, name: &str, limit: usize) -> Option<Vec<serde_json::Value>> {
        self.config(name)?;
        {
            let entries = self.entries.read().await;
            if let Some(e) = entries.get(name) {
                return Some(e.rows.iter().take(limit).cloned().collect());
            }
        }
        self.refresh_one(name).await;
        let entries = self.entries.read().await;
        entries.get(name).map(|e| e.rows.iter().take(limit).cloned().collect())
    }

    async fn fetch_rows(&self, url: &str) -> Result<Vec<serde_json::Value>, String> {
        let client = self.client.as_ref().ok_or("HTTP client unavailable")?;
        let res = client.get(url).send().await.map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            return Err(format!("Source HTTP {}", res.status()));
        }
        res.json::<Vec<serde_json::Value>>().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_registry() -> DatasetRegistry {
        DatasetRegistry::new(seeds::default_datasets())
    }

    #[tokio::test]
    async fn inventory_reports_not_loaded_before_any_refresh() {
        let reg = demo_registry();
        let list = reg.list().await;
        assert_eq!(list.len(), 2);
        for meta in &list {
            assert_eq!(meta.status, "not_loaded");
            assert_eq!(meta.sample_count_cached, 0);
            assert!(meta.last_refreshed_utc.is_none());
        }
    }

    #[tokio::test]
    async fn refresh_fills_counts_and_timestamp() {
        let reg = demo_registry();
        reg.refresh_all().await;
        for meta in reg.list().await {
            assert_eq!(meta.status, "ready", "{} not ready", meta.name);
            assert!(meta.sample_count_cached > 0);
            assert!(meta.last_refreshed_utc.is_some());
            assert!(meta.error.is_none());
        }
    }

    #[tokio::test]
    async fn samples_respect_the_limit_and_refresh_lazily() {
        let reg = demo_registry();
        // no explicit refresh; first access loads
        let rows = reg.samples("aac-symbols", 5).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(reg.list().await[0].status, "ready");
    }

    #[tokio::test]
    async fn unknown_dataset_is_none_not_error() {
        let reg = demo_registry();
        assert!(reg.samples("no-such-set", 5).await.is_none());
        assert!(reg.refresh_one("no-such-set").await.is_none());
    }

    #[tokio::test]
    async fn unreachable_source_marks_the_entry_error() {
        // nothing listens on port 9; the request fails fast
        let reg = DatasetRegistry::new(vec![DatasetCfg {
            name: "remote".into(),
            source_url: Some("http://127.0.0.1:9/rows.json".into()),
        }]);
        let meta = reg.refresh_one("remote").await.unwrap();
        assert_eq!(meta.status, "error");
        assert!(meta.error.is_some());
        assert_eq!(meta.sample_count_cached, 0);
        // inventory still lists it
        assert_eq!(reg.list().await[0].status, "error");
    }
}

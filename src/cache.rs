// src/cache.rs
//
// Short-lived cache of extracted table text. Five metrics fan out over
// three tables, and a badge refresh asks for all of them at once, so
// without this every page load would re-download a multi-megabyte ZIP
// several times over.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::extract::table_csv_text;
use crate::fetch::release::latest_tables_zip;
use crate::fetch::zips::download_zip;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableKey {
    dataset: String,
    table_number: u32,
}

/// One cached table. The `OnceCell` is the single-flight point: the first
/// caller runs the download, everyone else awaits the same cell. A failed
/// fill leaves the cell empty, so errors are never served from cache.
struct Slot {
    cell: Arc<OnceCell<Arc<String>>>,
    inserted: Instant,
}

pub struct TableCache {
    ttl: Duration,
    max_tables: usize,
    slots: Mutex<HashMap<TableKey, Slot>>,
}

impl TableCache {
    pub fn new(ttl: Duration, max_tables: usize) -> Self {
        TableCache {
            ttl,
            max_tables,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        TableCache::new(config.cache_ttl, config.cache_max_tables)
    }

    /// Text of `Table_<n>` from the current release, cached for the TTL.
    /// Concurrent calls for the same table share one download.
    pub async fn table_text(
        &self,
        client: &Client,
        config: &Config,
        table_number: u32,
    ) -> Result<Arc<String>> {
        let cell = self.slot(config, table_number).await;
        cell.get_or_try_init(|| async {
            fetch_table_text(client, config, table_number)
                .await
                .map(Arc::new)
        })
        .await
        .cloned()
    }

    /// Live cell for this table, creating or replacing the slot as needed.
    /// The map lock is held only while picking the slot, never across a
    /// download.
    async fn slot(&self, config: &Config, table_number: u32) -> Arc<OnceCell<Arc<String>>> {
        let key = TableKey {
            dataset: config.dataset.clone(),
            table_number,
        };
        let now = Instant::now();
        let mut slots = self.slots.lock().await;

        if let Some(slot) = slots.get(&key) {
            if now.duration_since(slot.inserted) < self.ttl {
                return slot.cell.clone();
            }
        }

        slots.retain(|_, slot| now.duration_since(slot.inserted) < self.ttl);
        while slots.len() >= self.max_tables {
            let oldest = slots
                .iter()
                .min_by_key(|(_, slot)| slot.inserted)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    debug!(table_number = key.table_number, "evicting cached table");
                    slots.remove(&key);
                }
                None => break,
            }
        }

        let cell = Arc::new(OnceCell::new());
        slots.insert(
            key,
            Slot {
                cell: cell.clone(),
                inserted: now,
            },
        );
        cell
    }
}

#[instrument(skip(client, config))]
async fn fetch_table_text(client: &Client, config: &Config, table_number: u32) -> Result<String> {
    let resource = latest_tables_zip(client, config).await?;
    info!(resource = %resource.name, url = %resource.url, "downloading current release");
    let bytes = download_zip(client, &resource.url).await?;
    table_csv_text(&bytes, table_number)
}

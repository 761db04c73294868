//! In-memory record store and the data-source seam that fills it.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use tracing::{debug, info, warn};

use crate::builder;
use crate::chain;
use crate::error::KisetsuError;
use crate::models::{RawRecord, RecordId};

/// A catalog that can return records by identifier in batches.
///
/// Identifiers the source does not know are simply absent from the result.
pub trait RecordSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(
        &self,
        ids: &[RecordId],
    ) -> impl Future<Output = Result<HashMap<RecordId, RawRecord>, Self::Error>> + Send;
}

/// Memoized records for one resolution run.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: HashMap<RecordId, RawRecord>,
    /// Requested from the source but not returned.
    missing: HashSet<RecordId>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn get(&self, id: RecordId) -> Option<&RawRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn insert(&mut self, record: RawRecord) {
        self.missing.remove(&record.id);
        self.records.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `id` was already requested and the source did not have it.
    pub fn is_missing(&self, id: RecordId) -> bool {
        self.missing.contains(&id)
    }

    /// Fetch the seeds and every prequel their chains will need.
    ///
    /// Prequel ids are discovered level by level and fetched in batches of at
    /// most `batch_size` until no new ids turn up.
    pub async fn prefetch<S: RecordSource>(
        &mut self,
        source: &S,
        seeds: &[RecordId],
        batch_size: usize,
    ) -> Result<(), KisetsuError> {
        self.fetch_absent(source, seeds, batch_size).await?;

        let mut seen: HashSet<RecordId> = seeds.iter().copied().collect();
        let mut frontier: Vec<RecordId> = seeds
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(builder::has_predecessor_signal))
            .collect();

        while !frontier.is_empty() {
            let prequels: Vec<RecordId> = frontier
                .iter()
                .filter_map(|id| self.get(*id))
                .filter_map(chain::preferred_prequel)
                .map(|edge| edge.target_id)
                .filter(|id| seen.insert(*id))
                .collect();

            debug!(count = prequels.len(), "Discovered prequels");
            self.fetch_absent(source, &prequels, batch_size).await?;
            frontier = prequels.into_iter().filter(|id| self.contains(*id)).collect();
        }

        info!(records = self.len(), missing = self.missing.len(), "Record store ready");
        Ok(())
    }

    /// Fetch ids that are neither stored nor known to be missing.
    pub async fn fetch_absent<S: RecordSource>(
        &mut self,
        source: &S,
        ids: &[RecordId],
        batch_size: usize,
    ) -> Result<(), KisetsuError> {
        let mut wanted: Vec<RecordId> = ids
            .iter()
            .copied()
            .filter(|id| !self.contains(*id) && !self.is_missing(*id))
            .collect();
        wanted.sort_unstable();
        wanted.dedup();

        for batch in wanted.chunks(batch_size.max(1)) {
            debug!(size = batch.len(), "Fetching record batch");
            let mut fetched = source
                .fetch(batch)
                .await
                .map_err(|e| KisetsuError::Source(e.to_string()))?;

            for &id in batch {
                match fetched.remove(&id) {
                    Some(record) => self.insert(record),
                    None => {
                        warn!(id, "Record not returned by source");
                        self.missing.insert(id);
                    }
                }
            }
        }
        Ok(())
    }
}

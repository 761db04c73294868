use tracing::{info, warn};

use crate::builder::EntryBuilder;
use crate::chain;
use crate::config::ResolverConfig;
use crate::error::KisetsuError;
use crate::mapping::{self, MappingFile};
use crate::models::{MergedEntry, RecordId};
use crate::store::RecordStore;
use crate::synonyms::SynonymFilter;

/// Result of resolving a batch of seeds.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Merged, de-duplicated and sorted entries.
    pub mapping: MappingFile,
    /// Seeds that could not be resolved.
    pub failures: Vec<(RecordId, KisetsuError)>,
}

/// Turns seed records into finalized show entries.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    builder: EntryBuilder,
    follow_prequels: bool,
}

impl Resolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            builder: EntryBuilder::new(SynonymFilter::new(config.similarity_threshold)),
            follow_prequels: config.follow_prequels,
        }
    }

    pub fn follows_prequels(&self) -> bool {
        self.follow_prequels
    }

    /// Resolve one seed into a re-indexed entry.
    pub fn resolve(&self, store: &RecordStore, seed: RecordId) -> Result<MergedEntry, KisetsuError> {
        if self.follow_prequels {
            return chain::resolve_chain(&self.builder, store, seed);
        }
        let record = store.get(seed).ok_or(KisetsuError::UnknownRecord(seed))?;
        Ok(self.builder.build_fragment(record)?.reindexed())
    }

    /// Resolve every seed; seeds sharing an earliest season become one entry.
    pub fn resolve_many(&self, store: &RecordStore, seeds: &[RecordId]) -> Resolution {
        let mut resolved = MappingFile::default();
        let mut failures = Vec::new();

        for &seed in seeds {
            match self.resolve(store, seed) {
                Ok(entry) => resolved.entries.push(entry.into_mapping()),
                Err(e) => {
                    warn!(seed, error = %e, "Failed to resolve seed");
                    failures.push((seed, e));
                }
            }
        }

        let mapping = mapping::merge([&resolved]);
        info!(
            seeds = seeds.len(),
            entries = mapping.entries.len(),
            failures = failures.len(),
            "Resolution finished"
        );
        Resolution { mapping, failures }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            builder: EntryBuilder::default(),
            follow_prequels: true,
        }
    }
}

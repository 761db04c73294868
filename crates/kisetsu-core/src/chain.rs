//! Prequel-chain walking.
//!
//! Starting from a seed record, follow prequel edges back to the earliest TV
//! season. TV prequels contribute a season slot and take over the entry's
//! title; movie, special and OVA prequels are walked through without adding
//! anything.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::builder::{self, EntryBuilder};
use crate::error::KisetsuError;
use crate::models::{MediaFormat, MergedEntry, RawRecord, RecordId, Relation, RelationType};
use crate::store::RecordStore;

/// Prequel formats worth bridging through when no TV prequel exists.
const BRIDGE_FORMATS: [MediaFormat; 3] = [MediaFormat::Movie, MediaFormat::Special, MediaFormat::Ova];

/// Why a chain walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStop {
    /// The seed carries no numeric hint of an earlier season.
    NotWalked,
    /// The last record has no usable prequel edge.
    NoPrequel,
    /// The chosen prequel was already part of this chain.
    Cycle(RecordId),
    /// The chosen prequel is unknown to the record store.
    Missing(RecordId),
}

/// A merged entry before re-indexing, with the reason the walk ended.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub entry: MergedEntry,
    pub stop: ChainStop,
}

/// Pick the prequel edge to follow: TV first, then movie, special, OVA.
pub fn preferred_prequel(record: &RawRecord) -> Option<&Relation> {
    let prequels = || {
        record
            .relations
            .iter()
            .filter(|r| r.relation_type == RelationType::Prequel)
    };

    prequels()
        .find(|r| r.target_format == Some(MediaFormat::Tv))
        .or_else(|| {
            BRIDGE_FORMATS
                .iter()
                .find_map(|&format| prequels().find(|r| r.target_format == Some(format)))
        })
}

/// Walk the prequel chain of `seed_id` and merge every TV season on it.
pub fn walk_chain(
    builder: &EntryBuilder,
    store: &RecordStore,
    seed_id: RecordId,
) -> Result<ChainOutcome, KisetsuError> {
    let seed = store.get(seed_id).ok_or(KisetsuError::UnknownRecord(seed_id))?;
    let mut entry = builder.build_fragment(seed)?;

    if !builder::has_predecessor_signal(seed) {
        return Ok(ChainOutcome {
            entry,
            stop: ChainStop::NotWalked,
        });
    }

    let mut visited = HashSet::from([seed_id]);
    let mut current = seed;

    let stop = loop {
        let Some(edge) = preferred_prequel(current) else {
            break ChainStop::NoPrequel;
        };
        let prequel_id = edge.target_id;

        if visited.contains(&prequel_id) {
            warn!(seed = seed_id, prequel = prequel_id, "Prequel cycle detected");
            break ChainStop::Cycle(prequel_id);
        }
        let Some(prequel) = store.get(prequel_id) else {
            warn!(seed = seed_id, prequel = prequel_id, "Prequel record unavailable");
            break ChainStop::Missing(prequel_id);
        };
        visited.insert(prequel_id);

        if edge.target_format == Some(MediaFormat::Tv) {
            let fragment = builder.build_fragment(prequel)?;
            debug!(seed = seed_id, prequel = prequel_id, title = %fragment.title, "Merged TV prequel");
            entry = entry.preceded_by(fragment);
        } else {
            debug!(seed = seed_id, prequel = prequel_id, format = ?edge.target_format, "Bridging non-TV prequel");
        }
        current = prequel;
    };

    debug!(seed = seed_id, ?stop, seasons = entry.seasons.len(), "Chain walk finished");
    Ok(ChainOutcome { entry, stop })
}

/// Resolve `seed_id` into a fully merged, re-indexed entry.
pub fn resolve_chain(
    builder: &EntryBuilder,
    store: &RecordStore,
    seed_id: RecordId,
) -> Result<MergedEntry, KisetsuError> {
    Ok(walk_chain(builder, store, seed_id)?.entry.reindexed())
}

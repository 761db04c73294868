use std::collections::HashMap;
use std::convert::Infallible;

use kisetsu_core::chain::{self, ChainStop};
use kisetsu_core::builder::EntryBuilder;
use kisetsu_core::mapping::MappingSeason;
use kisetsu_core::{
    MediaFormat, RawRecord, RecordId, RecordSource, RecordStore, Relation, RelationType, Resolver,
    SeasonSlot,
};

/// Catalog held entirely in memory.
struct Catalog(HashMap<RecordId, RawRecord>);

impl Catalog {
    fn new(records: Vec<RawRecord>) -> Self {
        Self(records.into_iter().map(|r| (r.id, r)).collect())
    }
}

impl RecordSource for Catalog {
    type Error = Infallible;

    async fn fetch(&self, ids: &[RecordId]) -> Result<HashMap<RecordId, RawRecord>, Infallible> {
        Ok(ids
            .iter()
            .filter_map(|id| self.0.get(id).cloned())
            .map(|r| (r.id, r))
            .collect())
    }
}

fn record(
    id: RecordId,
    english: &str,
    romaji: &str,
    episodes: u32,
    synonyms: &[&str],
    relations: Vec<Relation>,
) -> RawRecord {
    RawRecord {
        id,
        romaji_title: Some(romaji.into()),
        english_title: Some(english.into()),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        episode_count: Some(episodes),
        relations,
    }
}

fn tv_prequel(target: RecordId) -> Relation {
    Relation::new(target, RelationType::Prequel, MediaFormat::Tv)
}

fn slot(id: RecordId, season_number: u32, episode_count: u32, start_offset: u32) -> SeasonSlot {
    SeasonSlot {
        id,
        season_number,
        episode_count,
        start_offset,
    }
}

#[tokio::test]
async fn test_two_season_example_end_to_end() {
    let catalog = Catalog::new(vec![
        record(
            100,
            "Example Season 2",
            "Example 2",
            12,
            &["Ex S2"],
            vec![
                Relation::new(101, RelationType::Sequel, MediaFormat::Tv),
                tv_prequel(99),
            ],
        ),
        record(99, "Example", "Example", 24, &[], Vec::new()),
    ]);

    let mut store = RecordStore::new();
    store.prefetch(&catalog, &[100], 50).await.unwrap();

    let entry = Resolver::default().resolve(&store, 100).unwrap();
    assert_eq!(entry.title, "Example");
    assert!(entry.synonyms.is_empty());
    assert_eq!(entry.seasons, vec![slot(99, 1, 24, 1), slot(100, 2, 12, 1)]);

    let mapping = entry.into_mapping();
    assert_eq!(
        mapping.seasons,
        vec![
            MappingSeason { season: 1, anilist_id: 99, start: 1 },
            MappingSeason { season: 2, anilist_id: 100, start: 1 },
        ]
    );
}

#[test]
fn test_three_node_cycle_terminates() {
    let store = RecordStore::from_records([
        record(1, "Loop III", "Loop III", 12, &[], vec![tv_prequel(2)]),
        record(2, "Loop II", "Loop II", 12, &[], vec![tv_prequel(3)]),
        record(3, "Loop", "Loop", 12, &[], vec![tv_prequel(1)]),
    ]);

    let outcome = chain::walk_chain(&EntryBuilder::default(), &store, 1).unwrap();
    assert_eq!(outcome.stop, ChainStop::Cycle(1));
    assert_eq!(outcome.entry.season_ids(), vec![3, 2, 1]);
    assert_eq!(outcome.entry.title, "Loop");

    let entry = outcome.entry.reindexed();
    let numbers: Vec<u32> = entry.seasons.iter().map(|s| s.season_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn test_split_cour_collapses_into_one_season() {
    let store = RecordStore::from_records([
        record(
            20,
            "Show Season 2 Part 2",
            "Show 2nd Season Part 2",
            11,
            &[],
            vec![tv_prequel(19)],
        ),
        record(19, "Show Season 2", "Show 2nd Season", 13, &[], vec![tv_prequel(18)]),
        record(18, "Show", "Show", 12, &[], Vec::new()),
    ]);

    let entry = Resolver::default().resolve(&store, 20).unwrap();
    assert_eq!(
        entry.seasons,
        vec![slot(18, 1, 12, 1), slot(19, 2, 13, 1), slot(20, 2, 11, 14)]
    );
}

#[test]
fn test_reindex_is_idempotent_on_resolved_entry() {
    let store = RecordStore::from_records([
        record(20, "Show Season 2", "Show 2", 11, &[], vec![tv_prequel(19)]),
        record(19, "Show Season 2", "Show 2", 13, &[], Vec::new()),
    ]);

    let entry = Resolver::default().resolve(&store, 20).unwrap();
    let again = entry.clone().reindexed();
    assert_eq!(entry, again);
}

#[tokio::test]
async fn test_ova_bridge_and_unknown_prequel() {
    let catalog = Catalog::new(vec![
        record(
            30,
            "Saga III",
            "Saga III",
            12,
            &[],
            vec![Relation::new(29, RelationType::Prequel, MediaFormat::Ova)],
        ),
        record(29, "Saga OVA", "Saga OVA", 2, &[], vec![tv_prequel(28)]),
        record(28, "Saga II", "Saga II", 12, &[], vec![tv_prequel(27)]),
    ]);

    let mut store = RecordStore::new();
    store.prefetch(&catalog, &[30], 2).await.unwrap();
    assert!(store.is_missing(27));

    let outcome = chain::walk_chain(&EntryBuilder::default(), &store, 30).unwrap();
    assert_eq!(outcome.stop, ChainStop::Missing(27));
    assert_eq!(outcome.entry.season_ids(), vec![28, 30]);
    assert_eq!(outcome.entry.title, "Saga II");
}

#[test]
fn test_missing_titles_fail_the_seed_only() {
    let mut broken = record(2, "", "", 12, &[], Vec::new());
    broken.english_title = None;
    let store = RecordStore::from_records([broken, record(1, "Show", "Show", 12, &[], Vec::new())]);

    let resolution = Resolver::default().resolve_many(&store, &[1, 2]);
    assert_eq!(resolution.mapping.entries.len(), 1);
    assert_eq!(resolution.failures.len(), 1);
    assert_eq!(resolution.failures[0].0, 2);
}

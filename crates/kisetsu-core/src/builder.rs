use std::collections::BTreeSet;

use crate::error::KisetsuError;
use crate::models::{MergedEntry, RawRecord, SeasonSlot};
use crate::synonyms::SynonymFilter;
use crate::title;

/// Apostrophe variant that media servers fail to match against plain `'`.
const RIGHT_SINGLE_QUOTE: char = '\u{2019}';

/// Turns single records into one-season entry fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryBuilder {
    filter: SynonymFilter,
}

impl EntryBuilder {
    pub fn new(filter: SynonymFilter) -> Self {
        Self { filter }
    }

    /// Build the entry fragment for one record.
    pub fn build_fragment(&self, record: &RawRecord) -> Result<MergedEntry, KisetsuError> {
        let (english, romaji) = record_titles(record)?;

        let season = record_season(record, english, romaji);

        let mut synonyms = BTreeSet::new();
        let title = if english.contains(RIGHT_SINGLE_QUOTE) {
            synonyms.insert(english.to_string());
            english.replace(RIGHT_SINGLE_QUOTE, "'")
        } else {
            english.to_string()
        };

        synonyms.extend(
            record
                .synonyms
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && self.filter.accepts(s, &title, romaji))
                .map(str::to_string),
        );
        if romaji != title {
            synonyms.insert(romaji.to_string());
        }
        synonyms.remove(&title);

        Ok(MergedEntry {
            title,
            synonyms,
            seasons: vec![SeasonSlot {
                id: record.id,
                season_number: season,
                episode_count: record.episode_count.unwrap_or(0),
                start_offset: 1,
            }],
        })
    }
}

/// Whether a record's titles suggest an earlier season exists.
///
/// True for a season number above 1, synonym markers included, or any
/// trailing numeral on either title.
pub fn has_predecessor_signal(record: &RawRecord) -> bool {
    let Ok((english, romaji)) = record_titles(record) else {
        return false;
    };
    record_season(record, english, romaji) > 1
        || title::extract_ending_number(english).is_some()
        || title::extract_ending_number(romaji).is_some()
}

/// Season from both titles, raised by any season marker among the synonyms.
fn record_season(record: &RawRecord, english: &str, romaji: &str) -> u32 {
    record
        .synonyms
        .iter()
        .filter_map(|s| title::extract_season_number(s))
        .fold(title::resolve_season_number(english, romaji), u32::max)
}

/// `(english, romaji)`, each falling back to the other.
fn record_titles(record: &RawRecord) -> Result<(&str, &str), KisetsuError> {
    fn present(t: &Option<String>) -> Option<&str> {
        t.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    match (present(&record.english_title), present(&record.romaji_title)) {
        (Some(english), Some(romaji)) => Ok((english, romaji)),
        (Some(english), None) => Ok((english, english)),
        (None, Some(romaji)) => Ok((romaji, romaji)),
        (None, None) => Err(KisetsuError::MissingTitle(record.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, english: Option<&str>, romaji: Option<&str>, synonyms: &[&str]) -> RawRecord {
        RawRecord {
            id,
            romaji_title: romaji.map(str::to_string),
            english_title: english.map(str::to_string),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            episode_count: Some(12),
            relations: Vec::new(),
        }
    }

    #[test]
    fn test_basic_fragment() {
        let rec = record(
            100,
            Some("Example Season 2"),
            Some("Example 2"),
            &["Example S2", "進撃の巨人"],
        );
        let entry = EntryBuilder::default().build_fragment(&rec).unwrap();
        assert_eq!(entry.title, "Example Season 2");
        assert!(entry.synonyms.contains("Example S2"));
        assert!(entry.synonyms.contains("Example 2"));
        assert!(!entry.synonyms.contains("進撃の巨人"));
        assert_eq!(
            entry.seasons,
            vec![SeasonSlot {
                id: 100,
                season_number: 2,
                episode_count: 12,
                start_offset: 1,
            }]
        );
    }

    #[test]
    fn test_english_falls_back_to_romaji() {
        let rec = record(5, None, Some("Shingeki no Kyojin"), &[]);
        let entry = EntryBuilder::default().build_fragment(&rec).unwrap();
        assert_eq!(entry.title, "Shingeki no Kyojin");
        assert!(entry.synonyms.is_empty());
    }

    #[test]
    fn test_missing_titles_fail() {
        let rec = record(7, None, Some("   "), &[]);
        let err = EntryBuilder::default().build_fragment(&rec).unwrap_err();
        assert!(matches!(err, KisetsuError::MissingTitle(7)));
    }

    #[test]
    fn test_season_marker_in_synonym_counts() {
        let rec = record(8, Some("Show"), Some("Show"), &["Show 3rd Season"]);
        let entry = EntryBuilder::default().build_fragment(&rec).unwrap();
        assert_eq!(entry.seasons[0].season_number, 3);
    }

    #[test]
    fn test_apostrophe_normalized_and_original_kept() {
        let rec = record(9, Some("Frieren’s Journey"), Some("Sousou no Frieren"), &[]);
        let entry = EntryBuilder::default().build_fragment(&rec).unwrap();
        assert_eq!(entry.title, "Frieren's Journey");
        assert!(entry.synonyms.contains("Frieren’s Journey"));
        assert!(entry.synonyms.contains("Sousou no Frieren"));
    }

    #[test]
    fn test_title_never_its_own_synonym() {
        let rec = record(10, Some("Show"), Some("Show"), &["Show"]);
        let entry = EntryBuilder::default().build_fragment(&rec).unwrap();
        assert!(entry.synonyms.is_empty());
    }

    #[test]
    fn test_missing_episode_count_is_zero() {
        let mut rec = record(11, Some("Show"), None, &[]);
        rec.episode_count = None;
        let entry = EntryBuilder::default().build_fragment(&rec).unwrap();
        assert_eq!(entry.seasons[0].episode_count, 0);
    }

    #[test]
    fn test_predecessor_signal() {
        assert!(has_predecessor_signal(&record(1, Some("Show III"), None, &[])));
        assert!(has_predecessor_signal(&record(1, Some("Show Season 2"), None, &[])));
        assert!(!has_predecessor_signal(&record(1, Some("Show"), Some("Show"), &[])));
        assert!(!has_predecessor_signal(&record(1, None, None, &[])));
    }

    #[test]
    fn test_synonym_marker_is_a_predecessor_signal() {
        let rec = record(2, Some("Show Kan"), Some("Show Kan"), &["Show 2nd Season"]);
        assert!(has_predecessor_signal(&rec));
    }
}

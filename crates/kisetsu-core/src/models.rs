use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// AniList media identifier.
pub type RecordId = u64;

/// Release format of a catalog record, spelled the way AniList spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Tv,
    TvShort,
    Movie,
    Special,
    Ova,
    Ona,
    Music,
    Manga,
    Novel,
    OneShot,
    #[serde(other)]
    Unknown,
}

/// Kind of a relation edge between two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Adaptation,
    Prequel,
    Sequel,
    Parent,
    SideStory,
    Character,
    Summary,
    Alternative,
    SpinOff,
    Other,
    Source,
    Compilation,
    Contains,
    #[serde(other)]
    Unknown,
}

/// A typed edge from one record to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub target_id: RecordId,
    pub relation_type: RelationType,
    pub target_format: Option<MediaFormat>,
}

impl Relation {
    pub fn new(target_id: RecordId, relation_type: RelationType, target_format: MediaFormat) -> Self {
        Self {
            target_id,
            relation_type,
            target_format: Some(target_format),
        }
    }
}

/// One catalog record as delivered by the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: RecordId,
    pub romaji_title: Option<String>,
    pub english_title: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// One record's contribution to a merged entry's season numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonSlot {
    pub id: RecordId,
    pub season_number: u32,
    pub episode_count: u32,
    /// 1-based episode index at which this slot begins within its season.
    pub start_offset: u32,
}

/// A show identity assembled from one or more records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    pub title: String,
    pub synonyms: BTreeSet<String>,
    /// Chain order, earliest season first.
    pub seasons: Vec<SeasonSlot>,
}

impl MergedEntry {
    /// Combine a prequel fragment with this entry.
    ///
    /// The prequel's title and synonyms win; its slots come first.
    pub fn preceded_by(self, prequel: MergedEntry) -> MergedEntry {
        let mut seasons = prequel.seasons;
        seasons.extend(self.seasons);
        MergedEntry {
            title: prequel.title,
            synonyms: prequel.synonyms,
            seasons,
        }
    }

    pub fn season_ids(&self) -> Vec<RecordId> {
        self.seasons.iter().map(|s| s.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(id: RecordId, title: &str, season: u32) -> MergedEntry {
        MergedEntry {
            title: title.into(),
            synonyms: BTreeSet::from([format!("{title} alt")]),
            seasons: vec![SeasonSlot {
                id,
                season_number: season,
                episode_count: 12,
                start_offset: 1,
            }],
        }
    }

    #[test]
    fn test_preceded_by_takes_prequel_identity() {
        let merged = fragment(2, "Show 2", 2).preceded_by(fragment(1, "Show", 1));
        assert_eq!(merged.title, "Show");
        assert!(merged.synonyms.contains("Show alt"));
        assert!(!merged.synonyms.contains("Show 2 alt"));
        assert_eq!(merged.season_ids(), vec![1, 2]);
    }

    #[test]
    fn test_deserialize_anilist_enums() {
        let format: MediaFormat = serde_json::from_str("\"TV_SHORT\"").unwrap();
        assert_eq!(format, MediaFormat::TvShort);
        let format: MediaFormat = serde_json::from_str("\"TV\"").unwrap();
        assert_eq!(format, MediaFormat::Tv);
        let kind: RelationType = serde_json::from_str("\"SIDE_STORY\"").unwrap();
        assert_eq!(kind, RelationType::SideStory);
        let kind: RelationType = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(kind, RelationType::Unknown);
    }
}

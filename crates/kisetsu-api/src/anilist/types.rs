use serde::Deserialize;

use kisetsu_core::{MediaFormat, RawRecord, Relation, RelationType};

// ── GraphQL response wrappers ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PageResponse<T> {
    #[serde(rename = "Page")]
    pub page: PageData<T>,
}

#[derive(Debug, Deserialize)]
pub struct PageData<T> {
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    pub media: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

// ── Media queries ────────────────────────────────────────────────

/// Media with the fields season resolution needs.
#[derive(Debug, Deserialize)]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub episodes: Option<u32>,
    pub format: Option<MediaFormat>,
    pub synonyms: Option<Vec<String>>,
    pub relations: Option<RelationConnection>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelationConnection {
    pub edges: Vec<RelationEdge>,
}

#[derive(Debug, Deserialize)]
pub struct RelationEdge {
    #[serde(rename = "relationType")]
    pub relation_type: Option<RelationType>,
    pub node: Option<RelationNode>,
}

#[derive(Debug, Deserialize)]
pub struct RelationNode {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub format: Option<MediaFormat>,
}

/// Only the id, for season listings.
#[derive(Debug, Deserialize)]
pub struct MediaId {
    pub id: u64,
}

// ── Conversions ──────────────────────────────────────────────────

impl AniListMedia {
    pub fn into_raw_record(self) -> RawRecord {
        let (romaji_title, english_title) = match self.title {
            Some(t) => (t.romaji, t.english),
            None => (None, None),
        };

        let relations = self
            .relations
            .map(|r| r.edges)
            .unwrap_or_default()
            .into_iter()
            .filter_map(RelationEdge::into_relation)
            .collect();

        RawRecord {
            id: self.id,
            romaji_title,
            english_title,
            synonyms: self.synonyms.unwrap_or_default(),
            episode_count: self.episodes,
            relations,
        }
    }
}

impl RelationEdge {
    /// Anime-to-anime edges only; manga and novel sources are dropped.
    fn into_relation(self) -> Option<Relation> {
        let node = self.node?;
        if node.media_type.as_deref() != Some("ANIME") {
            return None;
        }
        Some(Relation {
            target_id: node.id,
            relation_type: self.relation_type.unwrap_or(RelationType::Unknown),
            target_format: node.format,
        })
    }
}

//! Mapping file model: the YAML document media servers read.
//!
//! ```yaml
//! entries:
//!   - title: "Example"
//!     synonyms:
//!       - "Ex"
//!     seasons:
//!       - season: 1
//!         anilist-id: 99
//!       - season: 1
//!         anilist-id: 100
//!         start: 25
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::KisetsuError;
use crate::models::{MergedEntry, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFile {
    #[serde(default)]
    pub entries: Vec<MappingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    pub seasons: Vec<MappingSeason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSeason {
    pub season: u32,
    #[serde(rename = "anilist-id")]
    pub anilist_id: RecordId,
    #[serde(default = "first_episode", skip_serializing_if = "is_first_episode")]
    pub start: u32,
}

fn first_episode() -> u32 {
    1
}

fn is_first_episode(start: &u32) -> bool {
    *start == 1
}

impl MergedEntry {
    /// Finalize into a mapping entry with deterministic ordering.
    pub fn into_mapping(self) -> MappingEntry {
        let mut seasons: Vec<MappingSeason> = self
            .seasons
            .iter()
            .map(|slot| MappingSeason {
                season: slot.season_number,
                anilist_id: slot.id,
                start: slot.start_offset,
            })
            .collect();
        sort_seasons(&mut seasons);

        MappingEntry {
            title: self.title,
            synonyms: sorted_titles(self.synonyms),
            seasons,
        }
    }
}

impl MappingEntry {
    /// Identifier of the first listed season, used to recognize the same show.
    pub fn base_id(&self) -> Option<RecordId> {
        self.seasons.first().map(|s| s.anilist_id)
    }
}

impl MappingFile {
    pub fn from_yaml(content: &str) -> Result<Self, KisetsuError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String, KisetsuError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn read(path: &Path) -> Result<Self, KisetsuError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn write(&self, path: &Path) -> Result<(), KisetsuError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Order entries by case-folded title, then raw title.
    pub fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| title_key(&a.title).cmp(&title_key(&b.title)));
    }
}

/// Combine mapping files in order.
///
/// Entries describe the same show when their first seasons share an id. The
/// combined entry keeps the first title seen, absorbs the other titles and
/// synonyms, and holds the union of seasons keyed by `(season, id)` with the
/// later file's season winning.
pub fn merge<'a>(files: impl IntoIterator<Item = &'a MappingFile>) -> MappingFile {
    struct Merged {
        title: String,
        synonyms: BTreeSet<String>,
        seasons: BTreeMap<(u32, RecordId), MappingSeason>,
    }

    let mut order: Vec<RecordId> = Vec::new();
    let mut by_base: HashMap<RecordId, Merged> = HashMap::new();

    for entry in files.into_iter().flat_map(|f| &f.entries) {
        let Some(base_id) = entry.base_id() else {
            warn!(title = %entry.title, "Skipping mapping entry without seasons");
            continue;
        };
        let seasons = entry
            .seasons
            .iter()
            .map(|s| ((s.season, s.anilist_id), *s));

        match by_base.get_mut(&base_id) {
            Some(merged) => {
                debug!(base_id, title = %entry.title, "Merging duplicate entry");
                merged.synonyms.extend(entry.synonyms.iter().cloned());
                merged.synonyms.insert(entry.title.clone());
                merged.seasons.extend(seasons);
            }
            None => {
                order.push(base_id);
                by_base.insert(
                    base_id,
                    Merged {
                        title: entry.title.clone(),
                        synonyms: entry.synonyms.iter().cloned().collect(),
                        seasons: seasons.collect(),
                    },
                );
            }
        }
    }

    let mut file = MappingFile {
        entries: order
            .into_iter()
            .filter_map(|id| by_base.remove(&id))
            .map(|mut merged| {
                merged.synonyms.remove(&merged.title);
                let mut seasons: Vec<MappingSeason> = merged.seasons.into_values().collect();
                sort_seasons(&mut seasons);
                MappingEntry {
                    title: merged.title,
                    synonyms: sorted_titles(merged.synonyms),
                    seasons,
                }
            })
            .collect(),
    };
    file.sort();
    file
}

/// Merge every `*.yaml` file directly inside `dir`, in file-name order.
pub fn merge_directory(dir: &Path) -> Result<MappingFile, KisetsuError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        debug!(path = %path.display(), "Reading mapping file");
        files.push(MappingFile::read(path)?);
    }
    Ok(merge(&files))
}

fn sort_seasons(seasons: &mut [MappingSeason]) {
    seasons.sort_by_key(|s| (s.season, s.start, s.anilist_id));
}

fn sorted_titles(titles: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut titles: Vec<String> = titles.into_iter().collect();
    titles.sort_by(|a, b| title_key(a).cmp(&title_key(b)));
    titles
}

/// Unicode lowercase as the case fold, then the raw title; both compare by code point.
fn title_key(title: &str) -> (String, &str) {
    (title.to_lowercase(), title)
}

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::error::AniListError;

const ANILIST_HOST: &str = "anilist.co";

static RE_ANIME_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/?anime/([0-9]+)").unwrap());

/// Extract an AniList media id from user input.
///
/// Accepts `154587`, `https://anilist.co/anime/154587/Sousou-no-Frieren/`
/// and any path containing `/anime/154587`.
pub fn parse_media_id(input: &str) -> Result<u64, AniListError> {
    let input = input.trim();
    let invalid = || AniListError::InvalidMediaUrl(input.to_string());

    let id = if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        input.parse().ok()
    } else {
        match Url::parse(input) {
            Ok(url) if url.host_str() == Some(ANILIST_HOST) => anime_url_id(&url),
            _ => RE_ANIME_PATH
                .captures(input)
                .and_then(|caps| caps[1].parse().ok()),
        }
    };

    // AniList ids start at 1.
    id.filter(|&id| id > 0).ok_or_else(invalid)
}

/// `https://anilist.co/anime/<id>/...`; other anilist.co pages are rejected.
fn anime_url_id(url: &Url) -> Option<u64> {
    let mut segments = url.path_segments()?;
    if segments.next() != Some("anime") {
        return None;
    }
    segments.next()?.parse().ok()
}

use std::collections::HashMap;

use reqwest::Client;
use tracing::{debug, info};

use kisetsu_core::{RawRecord, RecordId, RecordSource};

use super::error::AniListError;
use super::types::{AniListMedia, GraphQLResponse, MediaId, PageResponse};
use crate::season::AnimeSeason;

pub const DEFAULT_API_URL: &str = "https://graphql.anilist.co";

/// AniList caps `perPage` at 50.
const MAX_PER_PAGE: u32 = 50;

const MEDIA_BY_IDS_QUERY: &str = r#"
query ($ids: [Int], $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo { hasNextPage }
        media(id_in: $ids, type: ANIME) {
            id
            title { romaji english }
            episodes
            format
            synonyms
            relations {
                edges {
                    relationType(version: 2)
                    node { id type format }
                }
            }
        }
    }
}
"#;

const SEASON_IDS_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo { hasNextPage }
        media(season: $season, seasonYear: $seasonYear, type: ANIME, format: TV) {
            id
        }
    }
}
"#;

/// AniList GraphQL API client.
pub struct AniListClient {
    api_url: String,
    access_token: Option<String>,
    per_page: u32,
    http: Client,
}

impl AniListClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            access_token: None,
            per_page: MAX_PER_PAGE,
            http: Client::new(),
        }
    }

    /// Authenticated requests get a higher rate limit; media queries work without.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AniListError> {
        let mut request = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }));
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = request.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AniListError::Api {
                status,
                message: body,
            });
        }

        let body: GraphQLResponse<T> = resp
            .json()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))?;

        match body.data {
            Some(data) if body.errors.is_empty() => Ok(data),
            _ => Err(AniListError::GraphQL(
                body.errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }

    /// Fetch media records by id, following pagination.
    pub async fn fetch_media(&self, ids: &[u64]) -> Result<Vec<AniListMedia>, AniListError> {
        let mut media = Vec::new();
        let mut page = 1;

        loop {
            debug!(ids = ids.len(), page, "Requesting AniList media");
            let resp: PageResponse<AniListMedia> = self
                .graphql_request(
                    MEDIA_BY_IDS_QUERY,
                    serde_json::json!({
                        "ids": ids,
                        "page": page,
                        "perPage": self.per_page,
                    }),
                )
                .await?;

            media.extend(resp.page.media);
            if !resp.page.page_info.is_some_and(|p| p.has_next_page) {
                break;
            }
            page += 1;
        }

        Ok(media)
    }

    /// Ids of every TV anime airing in the given season.
    pub async fn season_media_ids(
        &self,
        year: i32,
        season: AnimeSeason,
    ) -> Result<Vec<u64>, AniListError> {
        let mut ids = Vec::new();
        let mut page = 1;

        loop {
            let resp: PageResponse<MediaId> = self
                .graphql_request(
                    SEASON_IDS_QUERY,
                    serde_json::json!({
                        "season": season.to_anilist_str(),
                        "seasonYear": year,
                        "page": page,
                        "perPage": self.per_page,
                    }),
                )
                .await?;

            ids.extend(resp.page.media.into_iter().map(|m| m.id));
            if !resp.page.page_info.is_some_and(|p| p.has_next_page) {
                break;
            }
            page += 1;
        }

        info!(year, %season, count = ids.len(), "Fetched season listing");
        Ok(ids)
    }
}

impl Default for AniListClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl RecordSource for AniListClient {
    type Error = AniListError;

    async fn fetch(&self, ids: &[RecordId]) -> Result<HashMap<RecordId, RawRecord>, AniListError> {
        let media = self.fetch_media(ids).await?;
        Ok(media
            .into_iter()
            .map(|m| {
                let record = m.into_raw_record();
                (record.id, record)
            })
            .collect())
    }
}

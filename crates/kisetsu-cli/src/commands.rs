use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use kisetsu_api::anilist::parse_media_id;
use kisetsu_api::{AniListClient, AniListError, AnimeSeason};
use kisetsu_core::config::AppConfig;
use kisetsu_core::mapping::{self, MappingFile};
use kisetsu_core::{KisetsuError, RecordId, RecordStore, Resolver};

use crate::{Cli, Command};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] KisetsuError),

    #[error(transparent)]
    Api(#[from] AniListError),

    #[error("{} already exists, pass --force to overwrite", .0.display())]
    OutputExists(PathBuf),

    #[error("none of the {0} requested media could be resolved")]
    NothingResolved(usize),
}

/// Config, client and resolver shared by the commands that talk to AniList.
struct Context {
    config: AppConfig,
    client: AniListClient,
    resolver: Resolver,
}

impl Context {
    fn load(config_path: Option<&Path>, token: Option<String>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load()?,
        };
        let mut client = AniListClient::new(config.anilist.api_url.as_str())
            .with_per_page(config.anilist.per_page);
        if let Some(token) = token {
            client = client.with_access_token(token);
        }
        let resolver = Resolver::new(&config.resolver);

        Ok(Self {
            config,
            client,
            resolver,
        })
    }

    /// Fetch what the seeds need and resolve them.
    async fn resolve_seeds(&self, seeds: &[RecordId]) -> Result<MappingFile, CliError> {
        let batch_size = self.config.anilist.batch_size;
        let mut store = RecordStore::new();
        if self.resolver.follows_prequels() {
            store.prefetch(&self.client, seeds, batch_size).await?;
        } else {
            store.fetch_absent(&self.client, seeds, batch_size).await?;
        }

        let resolution = self.resolver.resolve_many(&store, seeds);
        if resolution.mapping.entries.is_empty() && !resolution.failures.is_empty() {
            return Err(CliError::NothingResolved(seeds.len()));
        }
        Ok(resolution.mapping)
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Resolve { media, output } => {
            let seeds = media
                .iter()
                .map(|m| parse_media_id(m))
                .collect::<Result<Vec<_>, _>>()?;
            let ctx = Context::load(config_path, cli.token)?;
            let mapping = ctx.resolve_seeds(&seeds).await?;
            match output {
                Some(path) => {
                    mapping.write(&path)?;
                    info!(path = %path.display(), entries = mapping.entries.len(), "Wrote mapping file");
                }
                None => print!("{}", mapping.to_yaml()?),
            }
        }
        Command::Season {
            year,
            season,
            output_dir,
        } => {
            let ctx = Context::load(config_path, cli.token)?;
            let year = year.unwrap_or_else(AnimeSeason::current_year);
            let season = season.unwrap_or_else(AnimeSeason::current);
            let seeds = ctx.client.season_media_ids(year, season).await?;
            let mapping = ctx.resolve_seeds(&seeds).await?;

            let dir = output_dir.unwrap_or_else(|| ctx.config.output.directory.clone());
            let path = dir.join(season_file_name(year, season));
            mapping.write(&path)?;
            info!(path = %path.display(), entries = mapping.entries.len(), "Wrote season mapping file");
        }
        Command::Merge {
            input_dir,
            output,
            force,
        } => {
            let config = match config_path {
                Some(path) => AppConfig::load_from(path)?,
                None => AppConfig::load()?,
            };
            let input_dir = input_dir.unwrap_or_else(|| config.output.directory.clone());
            let output = output.unwrap_or_else(|| config.output.mappings_file.clone());
            ensure_writable(&output, force)?;

            let mapping = mapping::merge_directory(&input_dir)?;
            mapping.write(&output)?;
            info!(path = %output.display(), entries = mapping.entries.len(), "Wrote merged mappings");
        }
        Command::InitConfig { force } => {
            let path = AppConfig::config_path();
            ensure_writable(&path, force)?;
            AppConfig::defaults()?.save()?;
            info!(path = %path.display(), "Wrote default config");
        }
    }

    Ok(())
}

/// `2023-1-SPRING-Anime.yaml`.
fn season_file_name(year: i32, season: AnimeSeason) -> String {
    format!(
        "{year}-{}-{}-Anime.yaml",
        season.index(),
        season.to_anilist_str()
    )
}

fn ensure_writable(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_season_file_name() {
        assert_eq!(season_file_name(2023, AnimeSeason::Spring), "2023-1-SPRING-Anime.yaml");
        assert_eq!(season_file_name(2024, AnimeSeason::Fall), "2024-3-FALL-Anime.yaml");
    }

    #[test]
    fn test_ensure_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom_mappings.yaml");
        assert!(ensure_writable(&path, false).is_ok());

        std::fs::write(&path, "entries: []\n").unwrap();
        assert!(matches!(ensure_writable(&path, false), Err(CliError::OutputExists(_))));
        assert!(ensure_writable(&path, true).is_ok());
    }

    #[test]
    fn test_parse_season_command() {
        let cli = Cli::try_parse_from(["kisetsu", "season", "--year", "2023", "--season", "spring"]).unwrap();
        match cli.command {
            Command::Season { year, season, .. } => {
                assert_eq!(year, Some(2023));
                assert_eq!(season, Some(AnimeSeason::Spring));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_resolve_requires_media() {
        assert!(Cli::try_parse_from(["kisetsu", "resolve"]).is_err());
    }
}

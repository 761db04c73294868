mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kisetsu_api::AnimeSeason;

/// Build multi-season anime mapping files from AniList.
#[derive(Debug, Parser)]
#[command(name = "kisetsu", version, about)]
struct Cli {
    /// Config file to use instead of the user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// AniList access token, for the higher rate limit.
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve AniList ids or URLs into mapping entries.
    Resolve {
        /// Media ids, `anilist.co/anime/<id>` URLs or `/anime/<id>` paths.
        #[arg(required = true)]
        media: Vec<String>,

        /// Write the mapping file here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve every TV anime of a broadcast season.
    Season {
        #[arg(long)]
        year: Option<i32>,

        /// winter, spring, summer, fall or 0-3.
        #[arg(long)]
        season: Option<AnimeSeason>,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Merge every mapping file of a directory into one.
    Merge {
        #[arg(long)]
        input_dir: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists.
        #[arg(long)]
        force: bool,
    },

    /// Write the default config to the user config path.
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kisetsu=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

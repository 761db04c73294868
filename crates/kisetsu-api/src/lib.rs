pub mod anilist;
pub mod season;

pub use anilist::{AniListClient, AniListError};
pub use season::AnimeSeason;

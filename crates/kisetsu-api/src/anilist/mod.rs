pub mod client;
pub mod error;
pub mod id;
pub mod types;

pub use client::AniListClient;
pub use error::AniListError;
pub use id::parse_media_id;

pub mod builder;
pub mod chain;
pub mod config;
pub mod error;
pub mod mapping;
pub mod models;
pub mod reindex;
pub mod resolver;
pub mod store;
pub mod synonyms;
pub mod title;

pub use error::KisetsuError;
pub use models::{MediaFormat, MergedEntry, RawRecord, RecordId, Relation, RelationType, SeasonSlot};
pub use resolver::Resolver;
pub use store::{RecordSource, RecordStore};

pub mod export;
pub mod import;
pub mod ingest;
pub mod ranking;
pub mod repository;

pub use crate::domain::model::{FixedRankings, Participant, RankedEntry};
pub use crate::domain::ports::{KvStore, Storage};
pub use crate::utils::error::Result;

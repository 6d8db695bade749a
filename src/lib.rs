pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::Cli;

pub use crate::adapters::{FallbackKv, FileKv, LocalStorage, MemoryKv, RestKv};
pub use crate::config::AppConfig;
pub use crate::core::{
    ingest::parse_roster,
    ranking::rank,
    repository::{LeaderboardRepository, StoreKeys},
};
pub use crate::domain::model::{FixedRankings, Medal, Participant, RankedEntry};
pub use crate::utils::error::{LeaderboardError, Result};

use crate::core::ingest::parse_roster;
use crate::core::repository::LeaderboardRepository;
use crate::domain::model::Participant;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows: usize,
    pub qualified: usize,
    pub committed: bool,
}

/// Reads a roster file, parses it and, unless dry-running, commits it as the
/// new participant snapshot. Parsing never touches the store.
pub struct RosterImport<S: Storage> {
    source: S,
    repository: LeaderboardRepository,
}

impl<S: Storage> RosterImport<S> {
    pub fn new(source: S, repository: LeaderboardRepository) -> Self {
        Self { source, repository }
    }

    pub async fn preview(&self, path: &str) -> Result<Vec<Participant>> {
        tracing::info!("Reading roster from {}", path);
        let data = self.source.read_file(path).await?;
        let rows = parse_roster(&data)?;
        tracing::info!("Parsed {} participants", rows.len());
        Ok(rows)
    }

    pub async fn commit(&self, rows: &[Participant]) -> Result<()> {
        self.repository.replace_participants(rows).await
    }

    pub async fn run(&self, path: &str, dry_run: bool) -> Result<ImportSummary> {
        let rows = self.preview(path).await?;
        let qualified = rows.iter().filter(|p| p.is_qualifying()).count();

        if dry_run {
            tracing::info!("Dry run: {} rows not committed", rows.len());
        } else {
            self.commit(&rows).await?;
        }

        Ok(ImportSummary {
            rows: rows.len(),
            qualified,
            committed: !dry_run,
        })
    }
}

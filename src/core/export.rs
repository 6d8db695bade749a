use crate::config::ExportConfig;
use crate::domain::model::RankedEntry;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    rank: usize,
    name: &'a str,
    email: &'a str,
    skill_badges: u32,
    arcade_games: u32,
    profile_url: String,
    completion_date: String,
    qualified: bool,
}

impl<'a> From<&'a RankedEntry> for ExportRow<'a> {
    fn from(entry: &'a RankedEntry) -> Self {
        let p = &entry.participant;
        Self {
            rank: entry.rank,
            name: &p.name,
            email: &p.email,
            skill_badges: p.skill_badges,
            arcade_games: p.arcade_games,
            profile_url: p.profile_href().unwrap_or_default(),
            completion_date: p
                .qualifying_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            qualified: entry.qualified,
        }
    }
}

/// The ranked leaderboard rendered in every supported format.
#[derive(Debug, Clone)]
pub struct RenderedLeaderboard {
    pub csv_output: String,
    pub tsv_output: String,
    pub json_output: String,
}

impl RenderedLeaderboard {
    fn get(&self, format: &str) -> Option<&str> {
        match format {
            "csv" => Some(&self.csv_output),
            "tsv" => Some(&self.tsv_output),
            "json" => Some(&self.json_output),
            _ => None,
        }
    }
}

pub fn render(entries: &[RankedEntry]) -> Result<RenderedLeaderboard> {
    Ok(RenderedLeaderboard {
        csv_output: render_delimited(entries, b',')?,
        tsv_output: render_delimited(entries, b'\t')?,
        json_output: serde_json::to_string_pretty(entries)?,
    })
}

fn render_delimited(entries: &[RankedEntry], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for entry in entries {
        writer.serialize(ExportRow::from(entry))?;
    }
    if entries.is_empty() {
        writer.write_record([
            "rank",
            "name",
            "email",
            "skill_badges",
            "arcade_games",
            "profile_url",
            "completion_date",
            "qualified",
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Plain text table for terminals.
pub fn render_table(entries: &[RankedEntry]) -> String {
    let name_width = entries
        .iter()
        .map(|e| e.participant.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let email_width = entries
        .iter()
        .map(|e| e.participant.email.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut out = format!(
        "{:>4}  {:<nw$}  {:<ew$}  {:>6}  {:>6}  {:<10}  {}\n",
        "Rank",
        "Name",
        "Email",
        "Badges",
        "Games",
        "Completed",
        "Medal",
        nw = name_width,
        ew = email_width
    );

    for entry in entries {
        let p = &entry.participant;
        let completed = p
            .qualifying_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let medal = entry.medal.map(|m| m.as_str()).unwrap_or("");
        out.push_str(&format!(
            "{:>4}  {:<nw$}  {:<ew$}  {:>6}  {:>6}  {:<10}  {}\n",
            entry.rank,
            p.name,
            p.email,
            p.skill_badges,
            p.arcade_games,
            completed,
            medal,
            nw = name_width,
            ew = email_width
        ));
    }

    if entries.is_empty() {
        out.push_str("No participants found.\n");
    }
    out
}

/// Writes rendered leaderboards to storage, either as one ZIP or as loose files.
pub struct LeaderboardExporter<S: Storage> {
    storage: S,
    settings: ExportConfig,
}

impl<S: Storage> LeaderboardExporter<S> {
    pub fn new(storage: S, settings: ExportConfig) -> Self {
        Self { storage, settings }
    }

    /// Returns the paths written, relative to the storage root.
    pub async fn export(&self, entries: &[RankedEntry]) -> Result<Vec<String>> {
        let rendered = render(entries)?;
        let formats: Vec<&str> = self
            .settings
            .formats
            .iter()
            .map(String::as_str)
            .filter(|f| rendered.get(f).is_some())
            .collect();

        match self.settings.compression.as_ref().filter(|c| c.enabled) {
            Some(compression) => {
                tracing::debug!("Creating ZIP file with {} files", formats.len());

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    for format in &formats {
                        zip.start_file::<_, ()>(
                            format!("leaderboard.{}", format),
                            FileOptions::default(),
                        )?;
                        if let Some(body) = rendered.get(format) {
                            zip.write_all(body.as_bytes())?;
                        }
                    }
                    zip.finish()?.into_inner()
                };

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage
                    .write_file(&compression.filename, &zip_data)
                    .await?;
                Ok(vec![compression.filename.clone()])
            }
            None => {
                let mut written = Vec::with_capacity(formats.len());
                for format in formats {
                    let path = format!("leaderboard.{}", format);
                    if let Some(body) = rendered.get(format) {
                        self.storage.write_file(&path, body.as_bytes()).await?;
                    }
                    written.push(path);
                }
                Ok(written)
            }
        }
    }
}

//! Roster CSV extraction.
//!
//! Columns are positional; header names are never trusted.
//!
//! | column | field                          |
//! |--------|--------------------------------|
//! | 0 (A)  | Name                           |
//! | 1 (B)  | Email                          |
//! | 2 (C)  | profile URL or text with a URL |
//! | 6 (G)  | SkillBadges                    |
//! | 8 (I)  | ArcadeGames                    |
//! | 12 (M) | completion date                |

use crate::domain::dates::parse_completion_date;
use crate::domain::model::{is_qualifying, normalize_profile_url, parse_count, Participant};
use crate::utils::error::{LeaderboardError, Result};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::io::Read;
use std::sync::LazyLock;

const COL_NAME: usize = 0;
const COL_EMAIL: usize = 1;
const COL_PROFILE: usize = 2;
const COL_SKILL_BADGES: usize = 6;
const COL_ARCADE_GAMES: usize = 8;
const COL_COMPLETION_DATE: usize = 12;

// First http(s):// or www. token, e.g. from a HYPERLINK formula rendered as text.
static EMBEDDED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)https?://[A-Za-z0-9_\-.~:/?#\[\]@!$&'()*+,;=%]+|www\.[A-Za-z0-9_\-.~:/?#\[\]@!$&'()*+,;=%]+",
    )
    .expect("embedded url pattern")
});

/// Parses an uploaded roster. Any structural failure rejects the whole batch.
pub fn parse_roster(data: &[u8]) -> Result<Vec<Participant>> {
    if data.contains(&0) {
        return Err(LeaderboardError::RosterFormatError {
            message: "file is not delimited text".to_string(),
        });
    }
    parse_roster_reader(data)
}

pub fn parse_roster_reader<R: Read>(reader: R) -> Result<Vec<Participant>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut participants = Vec::new();
    let mut header_seen = false;

    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| LeaderboardError::RosterFormatError {
            message: format!("record {}: {}", line + 1, e),
        })?;

        if is_blank(&record) {
            continue;
        }
        if !header_seen {
            header_seen = true;
            tracing::debug!("Skipping roster header: {:?}", record);
            continue;
        }

        participants.push(extract_row(&record));
    }

    tracing::debug!("Parsed {} roster rows", participants.len());
    Ok(participants)
}

/// Maps one data row onto a participant. Malformed cells fall back to defaults.
pub fn extract_row(record: &StringRecord) -> Participant {
    let cell = |index: usize| record.get(index).unwrap_or("");

    let skill_badges = parse_count(cell(COL_SKILL_BADGES));
    let arcade_games = parse_count(cell(COL_ARCADE_GAMES));

    let completion_date = if is_qualifying(skill_badges, arcade_games) {
        parse_completion_date(cell(COL_COMPLETION_DATE))
    } else {
        None
    };

    Participant {
        name: cell(COL_NAME).trim().to_string(),
        email: cell(COL_EMAIL).trim().to_lowercase(),
        skill_badges,
        arcade_games,
        profile_url: extract_profile_url(cell(COL_PROFILE)),
        completion_date,
    }
}

/// Pulls the first embedded link out of a cell, or keeps the trimmed cell,
/// then ensures an http(s) scheme.
pub fn extract_profile_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let candidate = EMBEDDED_URL
        .find(trimmed)
        .map(|m| m.as_str())
        .unwrap_or(trimmed);
    normalize_profile_url(candidate).unwrap_or_default()
}

fn is_blank(record: &StringRecord) -> bool {
    record.is_empty() || (record.len() == 1 && record[0].is_empty())
}

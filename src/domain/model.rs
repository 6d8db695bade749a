use crate::domain::dates::parse_completion_date;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Skill badges required for a qualifying completion.
pub const QUALIFYING_SKILL_BADGES: u32 = 19;
/// Arcade games required for a qualifying completion.
pub const QUALIFYING_ARCADE_GAMES: u32 = 1;

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern"));

/// Email (lower-cased) to administrator assigned rank.
pub type FixedRankings = BTreeMap<String, u32>;

/// One roster row. Field names on the wire match the roster sheet export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Email", default)]
    pub email: String,

    #[serde(rename = "SkillBadges", default, deserialize_with = "lenient_count")]
    pub skill_badges: u32,

    #[serde(rename = "ArcadeGames", default, deserialize_with = "lenient_count")]
    pub arcade_games: u32,

    #[serde(rename = "ProfileURL", default)]
    pub profile_url: String,

    #[serde(
        rename = "CompletionDate",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub completion_date: Option<NaiveDate>,
}

impl Participant {
    pub fn is_qualifying(&self) -> bool {
        is_qualifying(self.skill_badges, self.arcade_games)
    }

    /// Completion date that takes part in ranking: only a qualifying participant has one.
    pub fn qualifying_date(&self) -> Option<NaiveDate> {
        self.completion_date.filter(|_| self.is_qualifying())
    }

    /// Key used to look up fixed rankings.
    pub fn override_key(&self) -> Option<String> {
        let email = self.email.trim();
        (!email.is_empty()).then(|| email.to_lowercase())
    }

    pub fn profile_href(&self) -> Option<String> {
        normalize_profile_url(&self.profile_url)
    }
}

pub fn is_qualifying(skill_badges: u32, arcade_games: u32) -> bool {
    skill_badges == QUALIFYING_SKILL_BADGES && arcade_games == QUALIFYING_ARCADE_GAMES
}

/// Trims `raw` and prepends `https://` when no http(s) scheme is present.
pub fn normalize_profile_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if URL_SCHEME.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{}", trimmed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
        }
    }
}

/// A participant at its position in the ranked order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub qualified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medal: Option<Medal>,
    #[serde(flatten)]
    pub participant: Participant,
}

impl RankedEntry {
    pub fn new(rank: usize, participant: Participant) -> Self {
        Self {
            rank,
            qualified: participant.is_qualifying(),
            medal: Medal::for_rank(rank),
            participant,
        }
    }
}

/// Counts arrive as numbers, numeric strings or junk; junk becomes 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(clamp_count).unwrap_or(0),
        serde_json::Value::String(s) => parse_count(&s),
        _ => 0,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => parse_completion_date(&s),
        _ => None,
    })
}

/// Parses a numeric cell; empty, non-numeric and non-finite input is 0.
pub fn parse_count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.parse::<f64>().map(clamp_count).unwrap_or(0)
}

fn clamp_count(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    value.trunc() as u32
}

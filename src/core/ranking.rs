//! Leaderboard ordering.
//!
//! Participants are ordered by a chain of tiers evaluated left to right. Each
//! tier either decides the pair or passes it on:
//!
//! 1. fixed rankings (both fixed: lower value first, ties keep input order;
//!    one fixed: it goes first)
//! 2. qualifying completion (earlier date first; a dated qualifier beats anyone
//!    without one; equal dates pass through)
//! 3. score (skill badges desc, arcade games desc, name in collation order)
//!
//! The sort is stable, so pairs no tier separates keep their input order.

use crate::domain::model::{FixedRankings, Participant, RankedEntry};
use chrono::NaiveDate;
use std::cmp::Ordering;

struct Candidate<'a> {
    participant: &'a Participant,
    fixed: Option<u32>,
    completed_on: Option<NaiveDate>,
}

impl<'a> Candidate<'a> {
    fn new(participant: &'a Participant, overrides: &FixedRankings) -> Self {
        Self {
            participant,
            fixed: participant
                .override_key()
                .and_then(|key| overrides.get(&key).copied()),
            completed_on: participant.qualifying_date(),
        }
    }
}

/// `Some` decides the pair, `None` defers to the next tier.
type Tier = fn(&Candidate<'_>, &Candidate<'_>) -> Option<Ordering>;

const TIERS: [Tier; 3] = [by_fixed_rank, by_completion_date, by_score];

fn by_fixed_rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Option<Ordering> {
    match (a.fixed, b.fixed) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        (None, None) => None,
    }
}

fn by_completion_date(a: &Candidate<'_>, b: &Candidate<'_>) -> Option<Ordering> {
    match (a.completed_on, b.completed_on) {
        (Some(x), Some(y)) => Some(x.cmp(&y)).filter(|o| o.is_ne()),
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        (None, None) => None,
    }
}

fn by_score(a: &Candidate<'_>, b: &Candidate<'_>) -> Option<Ordering> {
    let (a, b) = (a.participant, b.participant);
    Some(
        b.skill_badges
            .cmp(&a.skill_badges)
            .then_with(|| b.arcade_games.cmp(&a.arcade_games))
            .then_with(|| collate(&a.name, &b.name)),
    )
}

/// Dictionary order for display names: letters compare case-insensitively
/// first, then lower case sorts before upper case at the first difference.
/// `"amy" < "Amy" < "bob" < "Bob"`.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    folded(a)
        .cmp(&folded(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    TIERS
        .iter()
        .find_map(|tier| tier(a, b))
        .unwrap_or(Ordering::Equal)
}

/// Orders `participants` and numbers them from 1. Inputs are left untouched and
/// every participant appears exactly once in the result.
pub fn rank(participants: &[Participant], overrides: &FixedRankings) -> Vec<RankedEntry> {
    let mut candidates: Vec<Candidate<'_>> = participants
        .iter()
        .map(|p| Candidate::new(p, overrides))
        .collect();

    candidates.sort_by(compare);

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| RankedEntry::new(i + 1, c.participant.clone()))
        .collect()
}

/// Case-insensitive substring match on name or email. Ranks are kept from the
/// full ordering.
pub fn search(entries: &[RankedEntry], query: &str) -> Vec<RankedEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| {
            e.participant.name.to_lowercase().contains(&needle)
                || e.participant.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

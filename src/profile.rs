use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::aggregator::{frequencies, FrequencyEntry, FrequencyField};
use crate::bosses::BossNames;
use crate::model::{Difficulty, SessionRecord};
use crate::stats::{stat_distribution, GroupBy, StatDistribution};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierSummary {
    pub sessions: usize,
    /// Mean defeated count rounded to a whole number.
    pub avg_defeated: i64,
    pub skills_used: BTreeSet<String>,
    pub cards_used: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub name: String,
    pub sessions: usize,
    pub difficulties_played: BTreeSet<Difficulty>,
    pub unknown_difficulty_sessions: usize,
    pub per_difficulty: BTreeMap<Difficulty, TierSummary>,
    pub stats_by_tier: StatDistribution,
    pub overall: StatDistribution,
    pub skills: Vec<FrequencyEntry>,
    pub first_bosses: Vec<FrequencyEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProfileLookup {
    NotFound,
    /// Sessions exist but none recorded stat values.
    NoStats(PlayerProfile),
    Found(PlayerProfile),
}

pub fn player_profile(records: &[SessionRecord], name: &str, names: &BossNames) -> ProfileLookup {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return ProfileLookup::NotFound;
    }
    let mine: Vec<SessionRecord> = records
        .iter()
        .filter(|r| r.is_player(&wanted))
        .cloned()
        .collect();
    if mine.is_empty() {
        return ProfileLookup::NotFound;
    }

    let mut per_difficulty = BTreeMap::new();
    for tier in Difficulty::ALL {
        let in_tier: Vec<&SessionRecord> = mine
            .iter()
            .filter(|r| r.difficulty == Some(tier))
            .collect();
        if !in_tier.is_empty() {
            per_difficulty.insert(tier, summarize(&in_tier));
        }
    }

    let profile = PlayerProfile {
        name: mine[0].player_name.clone(),
        sessions: mine.len(),
        difficulties_played: per_difficulty.keys().copied().collect(),
        unknown_difficulty_sessions: mine.iter().filter(|r| r.difficulty.is_none()).count(),
        per_difficulty,
        stats_by_tier: stat_distribution(&mine, GroupBy::Difficulty),
        overall: stat_distribution(&mine, GroupBy::Everyone),
        skills: frequencies(&mine, FrequencyField::Skills, names),
        first_bosses: frequencies(&mine, FrequencyField::FirstBoss, names),
    };

    if mine.iter().any(|r| r.values.is_some()) {
        ProfileLookup::Found(profile)
    } else {
        ProfileLookup::NoStats(profile)
    }
}

fn summarize(records: &[&SessionRecord]) -> TierSummary {
    let total: i64 = records.iter().map(|r| r.defeated()).sum();
    let avg = total as f64 / records.len() as f64;

    let skills_used = records
        .iter()
        .flat_map(|r| r.skills.iter().cloned())
        .collect();
    let cards_used = records
        .iter()
        .flat_map(|r| r.selected_cards.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    TierSummary {
        sessions: records.len(),
        avg_defeated: avg.round() as i64,
        skills_used,
        cards_used,
    }
}

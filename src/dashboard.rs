use crate::aggregator::{self, CardBuckets, FrequencyEntry, FrequencyField, Leaderboard, TopN};
use crate::bosses::BossNames;
use crate::model::{Difficulty, SessionRecord};
use crate::normalize::normalize;
use crate::profile::{self, ProfileLookup};
use crate::source::RawRecords;
use crate::stats::{self, GroupBy, StatDistribution};

/// The normalized collection and the queries run against it. Every query
/// recomputes from the records; nothing is cached.
pub struct Dashboard {
    records: Vec<SessionRecord>,
    bosses: BossNames,
}

impl Dashboard {
    pub fn new(records: Vec<SessionRecord>, bosses: BossNames) -> Self {
        Self { records, bosses }
    }

    /// Normalize every raw payload once, at ingestion.
    pub fn from_raw(raw: &RawRecords, bosses: BossNames) -> Self {
        let records: Vec<SessionRecord> = raw.iter().map(|(k, v)| normalize(k, v)).collect();
        for r in records.iter().filter(|r| r.difficulty.is_none()) {
            vprintln!("normalize: record {} has no known difficulty; global views only", r.key);
        }
        Self::new(records, bosses)
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn leaderboard(&self, tier: Difficulty, top_n: TopN) -> Option<Leaderboard> {
        aggregator::leaderboard(&self.records, tier, top_n)
    }

    pub fn frequencies(&self, field: FrequencyField) -> Vec<FrequencyEntry> {
        aggregator::frequencies(&self.records, field, &self.bosses)
    }

    pub fn card_buckets(&self) -> CardBuckets {
        aggregator::card_buckets(&self.records)
    }

    pub fn stat_distribution(&self, group_by: GroupBy) -> StatDistribution {
        stats::stat_distribution(&self.records, group_by)
    }

    pub fn player_profile(&self, name: &str) -> ProfileLookup {
        profile::player_profile(&self.records, name, &self.bosses)
    }
}

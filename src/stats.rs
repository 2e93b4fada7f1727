//! Per-group stat averages and their percentage split, the data behind the
//! radar charts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::{zero_stats, Difficulty, SessionRecord, StatKey, StatVector};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupBy {
    Difficulty,
    /// Every record in a single "All" group.
    Everyone,
}

impl GroupBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "difficulty" | "tier" => Some(Self::Difficulty),
            "all" | "everyone" => Some(Self::Everyone),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Tier(Difficulty),
    Everyone,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tier(d) => write!(f, "{}", d),
            Self::Everyone => f.write_str("All"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupStats {
    pub sample_count: usize,
    pub mean: StatVector,
    /// Absent when every mean is zero.
    pub percentages: Option<StatVector>,
}

/// Groups in tier order; groups without samples are left out.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatDistribution {
    pub groups: BTreeMap<GroupKey, GroupStats>,
}

/// Suggested radial axis: `max = ceil(peak + 10)`, `step = ceil(max / 5)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisHint {
    pub max: f64,
    pub step: f64,
}

impl AxisHint {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let peak = values.into_iter().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        })?;
        let max = (peak + 10.0).ceil();
        Some(Self { max, step: (max / 5.0).ceil() })
    }
}

impl StatDistribution {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn mean_axis(&self) -> Option<AxisHint> {
        AxisHint::from_values(self.groups.values().flat_map(|g| g.mean.values().copied()))
    }

    pub fn percentage_axis(&self) -> Option<AxisHint> {
        AxisHint::from_values(
            self.groups
                .values()
                .filter_map(|g| g.percentages.as_ref())
                .flat_map(|p| p.values().copied()),
        )
    }
}

pub fn stat_distribution(records: &[SessionRecord], group_by: GroupBy) -> StatDistribution {
    let mut sums: BTreeMap<GroupKey, (usize, StatVector)> = BTreeMap::new();

    for r in records {
        let Some(values) = r.values.as_ref() else { continue };
        let key = match (group_by, r.difficulty) {
            (GroupBy::Everyone, _) => GroupKey::Everyone,
            (GroupBy::Difficulty, Some(d)) => GroupKey::Tier(d),
            (GroupBy::Difficulty, None) => continue,
        };
        let (count, acc) = sums.entry(key).or_insert_with(|| (0, zero_stats()));
        *count += 1;
        for (k, v) in values {
            *acc.entry(*k).or_insert(0.0) += v;
        }
    }

    let groups = sums
        .into_iter()
        .map(|(key, (count, total))| {
            let mean: StatVector = total
                .into_iter()
                .map(|(k, v)| (k, v / count as f64))
                .collect();
            let percentages = percentages(&mean);
            (key, GroupStats { sample_count: count, mean, percentages })
        })
        .collect();

    StatDistribution { groups }
}

/// Share of each stat in the total; `None` for a zero total.
pub fn percentages(mean: &StatVector) -> Option<StatVector> {
    let total: f64 = StatKey::ALL.iter().map(|k| mean.get(k).copied().unwrap_or(0.0)).sum();
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(
        StatKey::ALL
            .iter()
            .map(|k| (*k, mean.get(k).copied().unwrap_or(0.0) / total * 100.0))
            .collect(),
    )
}

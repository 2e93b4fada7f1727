use std::collections::HashMap;

use serde::Serialize;

use crate::bosses::BossNames;
use crate::model::{Difficulty, SessionRecord};

/// How many leaderboard rows to keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopN {
    All,
    Limit(usize),
}

impl TopN {
    /// "all" or a positive count.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        s.parse::<usize>().ok().filter(|n| *n > 0).map(Self::Limit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerScore {
    pub name: String,
    pub defeated: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Leaderboard {
    pub tier: Difficulty,
    /// Best `defeated` per player, in first-seen order.
    pub per_player_best: Vec<PlayerScore>,
    /// Players by best score, descending.
    pub top: Vec<PlayerScore>,
    pub mean_defeated: f64,
    pub best_player: String,
    pub best_value: i64,
    pub sessions: usize,
}

/// Per-tier leaderboard; `None` when the tier has no sessions.
pub fn leaderboard(records: &[SessionRecord], tier: Difficulty, top_n: TopN) -> Option<Leaderboard> {
    let filtered: Vec<&SessionRecord> = records
        .iter()
        .filter(|r| r.difficulty == Some(tier))
        .collect();
    if filtered.is_empty() {
        return None;
    }

    // player identity ignores case; the first spelling seen is shown
    let mut best: Vec<PlayerScore> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total: i64 = 0;

    for r in &filtered {
        let defeated = r.defeated();
        total += defeated;
        match index.get(&r.player_name.to_lowercase()) {
            Some(&i) => {
                if defeated > best[i].defeated {
                    best[i].defeated = defeated;
                }
            }
            None => {
                index.insert(r.player_name.to_lowercase(), best.len());
                best.push(PlayerScore { name: r.player_name.clone(), defeated });
            }
        }
    }

    // first maximum in mapping order
    let mut leader = &best[0];
    for p in &best[1..] {
        if p.defeated > leader.defeated {
            leader = p;
        }
    }
    let (best_player, best_value) = (leader.name.clone(), leader.defeated);

    let mut top = best.clone();
    top.sort_by_key(|p| std::cmp::Reverse(p.defeated));
    if let TopN::Limit(n) = top_n {
        top.truncate(n);
    }

    Some(Leaderboard {
        tier,
        per_player_best: best,
        top,
        mean_defeated: round2(total as f64 / filtered.len() as f64),
        best_player,
        best_value,
        sessions: filtered.len(),
    })
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrequencyField {
    Skills,
    Cards,
    /// Only the first remaining boss of each session.
    FirstBoss,
}

impl FrequencyField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skills" => Some(Self::Skills),
            "cards" => Some(Self::Cards),
            "first-boss" | "first_boss" | "boss" => Some(Self::FirstBoss),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: u64,
}

/// Label counts kept in first-seen order.
#[derive(Default)]
struct Tally {
    entries: Vec<FrequencyEntry>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, label: String) {
        match self.index.get(&label) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(label.clone(), self.entries.len());
                self.entries.push(FrequencyEntry { label, count: 1 });
            }
        }
    }

    /// Descending by count; stable, so ties keep first-seen order.
    fn into_sorted(self) -> Vec<FrequencyEntry> {
        let mut entries = self.entries;
        entries.sort_by_key(|e| std::cmp::Reverse(e.count));
        entries
    }
}

pub fn frequencies(
    records: &[SessionRecord],
    field: FrequencyField,
    names: &BossNames,
) -> Vec<FrequencyEntry> {
    let mut tally = Tally::default();
    for r in records {
        match field {
            FrequencyField::Skills => {
                for s in &r.skills {
                    tally.add(s.clone());
                }
            }
            FrequencyField::Cards => {
                for c in &r.selected_cards {
                    tally.add(c.to_string());
                }
            }
            FrequencyField::FirstBoss => {
                // a blank placeholder first means no identifiable boss
                if let Some(first) = r.bosses.first().filter(|b| !b.is_empty()) {
                    tally.add(names.label(first));
                }
            }
        }
    }
    tally.into_sorted()
}

pub const NORMAL_CARDS: std::ops::RangeInclusive<i64> = 1..=10;
pub const SPECIAL_CARDS: std::ops::RangeInclusive<i64> = 101..=110;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CardBuckets {
    pub normal: Vec<FrequencyEntry>,
    pub special: Vec<FrequencyEntry>,
}

/// Card usage split into the normal and special ranges; other IDs are dropped.
pub fn card_buckets(records: &[SessionRecord]) -> CardBuckets {
    let mut normal = Tally::default();
    let mut special = Tally::default();
    for c in records.iter().flat_map(|r| r.selected_cards.iter()) {
        if NORMAL_CARDS.contains(c) {
            normal.add(c.to_string());
        } else if SPECIAL_CARDS.contains(c) {
            special.add(c.to_string());
        }
    }
    CardBuckets {
        normal: normal.into_sorted(),
        special: special.into_sorted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record;

    fn scores(lb: &Leaderboard) -> Vec<(&str, i64)> {
        lb.per_player_best
            .iter()
            .map(|p| (p.name.as_str(), p.defeated))
            .collect()
    }

    #[test]
    fn two_player_example() {
        let records = vec![record("A", "easy", 2), record("B", "easy", 0)];
        let lb = leaderboard(&records, Difficulty::Easy, TopN::Limit(8)).expect("data");
        assert_eq!(scores(&lb), vec![("A", 48), ("B", 50)]);
        assert_eq!(lb.mean_defeated, 49.0);
        assert_eq!(lb.best_player, "B");
        assert_eq!(lb.best_value, 50);
        assert_eq!(lb.top[0].name, "B");
    }

    #[test]
    fn empty_tier_is_no_data() {
        let records = vec![record("A", "easy", 2), record("B", "weird", 0)];
        assert!(leaderboard(&records, Difficulty::Hard, TopN::All).is_none());
        assert!(leaderboard(&[], Difficulty::Easy, TopN::All).is_none());
    }

    #[test]
    fn mean_counts_every_session() {
        let records = vec![
            record("A", "hard", 10),
            record("A", "hard", 5),
            record("B", "HARD", 1),
            record("C", "easy", 0),
        ];
        let lb = leaderboard(&records, Difficulty::Hard, TopN::All).expect("data");
        let sum: i64 = records
            .iter()
            .filter(|r| r.difficulty == Some(Difficulty::Hard))
            .map(SessionRecord::defeated)
            .sum();
        assert_eq!(lb.sessions, 3);
        assert_eq!(lb.mean_defeated, round2(sum as f64 / 3.0));
        assert_eq!(lb.mean_defeated, 44.67);
        assert_eq!(scores(&lb), vec![("A", 45), ("B", 49)]);
    }

    #[test]
    fn players_match_case_insensitively() {
        let records = vec![record("Ana", "easy", 9), record("ANA", "easy", 3)];
        let lb = leaderboard(&records, Difficulty::Easy, TopN::All).expect("data");
        assert_eq!(scores(&lb), vec![("Ana", 47)]);
    }

    #[test]
    fn top_n_truncates_and_ties_keep_first_seen() {
        let records: Vec<_> = (0..10)
            .map(|i| record(&format!("p{}", i), "random", i % 3))
            .collect();
        let lb = leaderboard(&records, Difficulty::Random, TopN::Limit(8)).expect("data");
        assert_eq!(lb.top.len(), 8);
        let names: Vec<_> = lb.top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(&names[..4], &["p0", "p3", "p6", "p9"]);
        assert_eq!(lb.best_player, "p0");

        let all = leaderboard(&records, Difficulty::Random, TopN::All).expect("data");
        assert_eq!(all.top.len(), 10);
    }

    #[test]
    fn negative_defeated_is_kept() {
        let records = vec![record("A", "easy", 60)];
        let lb = leaderboard(&records, Difficulty::Easy, TopN::All).expect("data");
        assert_eq!(lb.best_value, -10);
        assert_eq!(lb.mean_defeated, -10.0);
    }

    #[test]
    fn top_n_parse() {
        assert_eq!(TopN::parse("all"), Some(TopN::All));
        assert_eq!(TopN::parse("8"), Some(TopN::Limit(8)));
        assert_eq!(TopN::parse("0"), None);
        assert_eq!(TopN::parse("x"), None);
    }

    fn with_skills(skills: &[&str]) -> SessionRecord {
        let mut r = record("p", "easy", 0);
        r.skills = skills.iter().map(|s| s.to_string()).collect();
        r
    }

    #[test]
    fn skill_counts_sorted_descending() {
        let records = vec![
            with_skills(&["dash", "shield"]),
            with_skills(&["heal", "shield"]),
            with_skills(&["shield", "dash"]),
        ];
        let f = frequencies(&records, FrequencyField::Skills, &BossNames::default());
        let got: Vec<_> = f.iter().map(|e| (e.label.as_str(), e.count)).collect();
        assert_eq!(got, vec![("shield", 3), ("dash", 2), ("heal", 1)]);
    }

    #[test]
    fn counts_ignore_input_order() {
        let mut records = vec![
            with_skills(&["a", "b"]),
            with_skills(&["b", "c"]),
            with_skills(&["c"]),
            with_skills(&["a", "c"]),
        ];
        let as_map = |rs: &[SessionRecord]| {
            frequencies(rs, FrequencyField::Skills, &BossNames::default())
                .into_iter()
                .map(|e| (e.label, e.count))
                .collect::<HashMap<_, _>>()
        };
        let forward = as_map(&records);
        records.reverse();
        assert_eq!(forward, as_map(&records));
    }

    #[test]
    fn first_boss_uses_labels() {
        let mut a = record("a", "easy", 0);
        a.bosses = vec!["1".into(), "5".into()];
        let mut b = record("b", "hard", 0);
        b.bosses = vec!["01".into()];
        let mut c = record("c", "hard", 0);
        c.bosses = vec!["77".into()];
        let d = record("d", "easy", 0);
        let f = frequencies(&[a, b, c, d], FrequencyField::FirstBoss, &BossNames::default());
        assert_eq!(
            f,
            vec![
                FrequencyEntry { label: "Worm".into(), count: 2 },
                FrequencyEntry { label: "Boss 77".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn blank_first_boss_is_skipped() {
        let mut a = record("a", "easy", 0);
        a.bosses = vec![String::new(), "1".into()];
        let mut b = record("b", "easy", 0);
        b.bosses = vec!["1".into()];
        let f = frequencies(&[a, b], FrequencyField::FirstBoss, &BossNames::default());
        assert_eq!(f, vec![FrequencyEntry { label: "Worm".into(), count: 1 }]);
    }

    #[test]
    fn card_ranges_split_and_drop() {
        let mut r = record("p", "easy", 0);
        r.selected_cards = vec![3, 105, 999];
        let buckets = card_buckets(&[r]);
        assert_eq!(buckets.normal, vec![FrequencyEntry { label: "3".into(), count: 1 }]);
        assert_eq!(buckets.special, vec![FrequencyEntry { label: "105".into(), count: 1 }]);
    }

    #[test]
    fn card_range_edges_are_inclusive() {
        let mut r = record("p", "easy", 0);
        r.selected_cards = vec![0, 1, 10, 11, 100, 101, 110, 111];
        let buckets = card_buckets(&[r.clone()]);
        let labels = |v: &[FrequencyEntry]| v.iter().map(|e| e.label.clone()).collect::<Vec<_>>();
        assert_eq!(labels(&buckets.normal), vec!["1", "10"]);
        assert_eq!(labels(&buckets.special), vec!["101", "110"]);

        let all = frequencies(&[r], FrequencyField::Cards, &BossNames::default());
        assert_eq!(all.len(), 8);
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Number of bosses in a full run; `defeated = TOTAL_BOSSES - remaining`.
pub const TOTAL_BOSSES: i64 = 50;

/// Display name for sessions stored without a player name.
pub const ANONYMOUS: &str = "Anónimo";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Random,
    Easy,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Random, Difficulty::Easy, Difficulty::Hard];

    /// Case-insensitive; anything outside the tier set is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "easy" => Some(Self::Easy),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Easy => "easy",
            Self::Hard => "hard",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Easy => "Easy",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StatKey {
    #[serde(rename = "vida")]
    Vida,
    #[serde(rename = "ataqueMelee")]
    AtaqueMelee,
    #[serde(rename = "ataqueRango")]
    AtaqueRango,
    #[serde(rename = "defensa")]
    Defensa,
    #[serde(rename = "velocidad")]
    Velocidad,
    #[serde(rename = "regenVida")]
    RegenVida,
    #[serde(rename = "regenMana")]
    RegenMana,
}

impl StatKey {
    pub const ALL: [StatKey; 7] = [
        StatKey::Vida,
        StatKey::AtaqueMelee,
        StatKey::AtaqueRango,
        StatKey::Defensa,
        StatKey::Velocidad,
        StatKey::RegenVida,
        StatKey::RegenMana,
    ];

    /// Field name as stored in the `values` object.
    pub fn field(self) -> &'static str {
        match self {
            Self::Vida => "vida",
            Self::AtaqueMelee => "ataqueMelee",
            Self::AtaqueRango => "ataqueRango",
            Self::Defensa => "defensa",
            Self::Velocidad => "velocidad",
            Self::RegenVida => "regenVida",
            Self::RegenMana => "regenMana",
        }
    }
}

/// One value per stat key, always complete.
pub type StatVector = BTreeMap<StatKey, f64>;

pub fn zero_stats() -> StatVector {
    StatKey::ALL.iter().map(|k| (*k, 0.0)).collect()
}

/// A normalized game session. Built once by `normalize`, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub key: String,
    pub player_name: String,
    /// `None` for values outside the tier set.
    pub difficulty: Option<Difficulty>,
    /// Bosses still standing when the session ended.
    pub bosses: Vec<String>,
    pub skills: Vec<String>,
    pub selected_cards: Vec<i64>,
    /// `None` when the session carried no `values` object.
    pub values: Option<StatVector>,
}

impl SessionRecord {
    /// Signed on purpose: more than `TOTAL_BOSSES` entries yields a negative count.
    pub fn defeated(&self) -> i64 {
        TOTAL_BOSSES - self.bosses.len() as i64
    }

    pub fn is_player(&self, name_lower: &str) -> bool {
        self.player_name.to_lowercase() == name_lower
    }
}

#[cfg(test)]
pub(crate) fn record(name: &str, difficulty: &str, bosses: usize) -> SessionRecord {
    SessionRecord {
        key: format!("k-{}-{}-{}", name, difficulty, bosses),
        player_name: name.to_string(),
        difficulty: Difficulty::parse(difficulty),
        bosses: (1..=bosses).map(|b| b.to_string()).collect(),
        skills: Vec::new(),
        selected_cards: Vec::new(),
        values: None,
    }
}

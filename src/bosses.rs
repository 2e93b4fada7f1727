// Boss identifiers as stored by the game ("1", "2", ...) mapped to display names.
// Only names known from the game ship here; the rest come from `[boss_labels]`
// in config.toml or render as "Boss {id}".

use std::collections::HashMap;

pub struct BossLabel {
    pub id: u16,
    pub label: &'static str,
}

pub static BOSS_LABELS: &[BossLabel] = &[
    BossLabel { id: 1, label: "Worm" },
];

fn parse_boss_id(s: &str) -> Option<u16> {
    s.trim().parse::<u16>().ok()
}

pub fn builtin_label(id: &str) -> Option<&'static str> {
    let num = parse_boss_id(id)?;
    BOSS_LABELS.iter().find(|b| b.id == num).map(|b| b.label)
}

/// Built-in table plus labels added through `config.toml`.
#[derive(Clone, Debug, Default)]
pub struct BossNames {
    extra: HashMap<String, String>,
}

impl BossNames {
    pub fn new(extra: &HashMap<String, String>) -> Self {
        let extra = extra
            .iter()
            .map(|(id, label)| (id.trim().to_string(), label.clone()))
            .collect();
        Self { extra }
    }

    pub fn label(&self, id: &str) -> String {
        let id = id.trim();
        if let Some(l) = self.extra.get(id) {
            return l.clone();
        }
        // "01" and "1" are the same boss
        if let Some(l) = parse_boss_id(id).and_then(|n| self.extra.get(&n.to_string())) {
            return l.clone();
        }
        match builtin_label(id) {
            Some(l) => l.to_string(),
            None => format!("Boss {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_use_the_table() {
        let names = BossNames::default();
        assert_eq!(names.label("1"), "Worm");
        assert_eq!(names.label(" 01 "), "Worm");
    }

    #[test]
    fn unknown_ids_fall_back() {
        let names = BossNames::default();
        assert_eq!(names.label("2"), "Boss 2");
        assert_eq!(names.label("42"), "Boss 42");
        assert_eq!(names.label("hydra"), "Boss hydra");
    }

    #[test]
    fn configured_labels_take_precedence() {
        let mut extra = HashMap::new();
        extra.insert("1".to_string(), "Sandworm".to_string());
        extra.insert("42".to_string(), "Leviathan".to_string());
        let names = BossNames::new(&extra);
        assert_eq!(names.label("1"), "Sandworm");
        assert_eq!(names.label("042"), "Leviathan");
        assert_eq!(names.label("2"), "Boss 2");
    }
}

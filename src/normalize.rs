use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{Difficulty, SessionRecord, StatKey, StatVector, ANONYMOUS};

/// Turn one raw record payload into a `SessionRecord`. Never fails: missing or
/// mistyped fields fall back to empty values.
pub fn normalize(key: &str, raw: &Value) -> SessionRecord {
    let obj = raw.as_object();
    let field = |name: &str| obj.and_then(|o| o.get(name));

    SessionRecord {
        key: key.to_string(),
        player_name: player_name(field("playerName")),
        difficulty: field("difficulty")
            .and_then(Value::as_str)
            .and_then(Difficulty::parse),
        bosses: boss_list(field("bosses")),
        skills: string_list(field("skills")),
        selected_cards: card_list(field("selectedCards")),
        values: field("values").and_then(Value::as_object).and_then(stat_values),
    }
}

/// Name as given (casing preserved); empty or absent -> "Anónimo".
fn player_name(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

/// A sequence, or a comma-separated string; anything else is empty.
fn tokens(v: Option<&Value>) -> Vec<Value> {
    match v {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => split_list(s)
            .into_iter()
            .map(Value::String)
            .collect(),
        _ => Vec::new(),
    }
}

/// Blank tokens are kept; `"1, ,2"` has three entries.
fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(|t| t.trim().to_string()).collect()
}

/// Every element counts toward `defeated`, so entries without a usable
/// identifier stay as "" placeholders.
fn boss_list(v: Option<&Value>) -> Vec<String> {
    tokens(v)
        .into_iter()
        .map(|t| match t {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
        .collect()
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    tokens(v)
        .into_iter()
        .filter_map(|t| match t {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn card_list(v: Option<&Value>) -> Vec<i64> {
    tokens(v).iter().filter_map(parse_card).collect()
}

/// Integers pass through; strings use leading-integer semantics ("7x" -> 7).
fn parse_card(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("static pattern"));
    re.find(s.trim()).and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Only a non-empty `values` object counts as carrying stats.
fn stat_values(obj: &Map<String, Value>) -> Option<StatVector> {
    if obj.is_empty() {
        return None;
    }
    Some(
        StatKey::ALL
            .iter()
            .map(|k| (*k, number(obj.get(k.field()))))
            .collect(),
    )
}

/// Loose numeric coercion; everything unusable is 0.
fn number(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) if s.trim().is_empty() => 0.0,
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_are_used_as_is() {
        let r = normalize(
            "k1",
            &json!({
                "playerName": "Ana",
                "difficulty": "Easy",
                "bosses": [3, "7"],
                "skills": ["dash", "shield"],
                "selectedCards": [3, 105]
            }),
        );
        assert_eq!(r.key, "k1");
        assert_eq!(r.player_name, "Ana");
        assert_eq!(r.difficulty, Some(Difficulty::Easy));
        assert_eq!(r.bosses, vec!["3", "7"]);
        assert_eq!(r.skills, vec!["dash", "shield"]);
        assert_eq!(r.selected_cards, vec![3, 105]);
        assert_eq!(r.values, None);
    }

    #[test]
    fn delimited_strings_are_split_and_trimmed() {
        let r = normalize(
            "k2",
            &json!({
                "bosses": " 4, 9 ,12",
                "skills": "dash, ,shield",
                "selectedCards": "1, 102 ,abc, 7x"
            }),
        );
        assert_eq!(r.bosses, vec!["4", "9", "12"]);
        assert_eq!(r.skills, vec!["dash", "shield"]);
        assert_eq!(r.selected_cards, vec![1, 102, 7]);
    }

    #[test]
    fn boss_entries_are_never_dropped() {
        let defeated = |bosses: Value| normalize("k", &json!({ "bosses": bosses })).defeated();
        assert_eq!(defeated(json!("")), 49);
        assert_eq!(defeated(json!("1, ,2")), 47);
        assert_eq!(defeated(json!([null, 3])), 48);
        assert_eq!(defeated(json!(["", "2"])), 48);
        assert_eq!(defeated(json!([])), 50);

        let r = normalize("k", &json!({ "bosses": [null, " 4 ", false] }));
        assert_eq!(r.bosses, vec!["", "4", ""]);
    }

    #[test]
    fn missing_fields_fall_back() {
        let r = normalize("k3", &json!({ "bosses": 12, "difficulty": "legendary" }));
        assert_eq!(r.player_name, ANONYMOUS);
        assert_eq!(r.difficulty, None);
        assert!(r.bosses.is_empty());
        assert!(r.skills.is_empty());
        assert!(r.selected_cards.is_empty());

        let r = normalize("k4", &json!({ "playerName": "   " }));
        assert_eq!(r.player_name, ANONYMOUS);

        let r = normalize("k5", &Value::Null);
        assert_eq!(r.player_name, ANONYMOUS);
    }

    #[test]
    fn non_numeric_cards_are_excluded() {
        let r = normalize("k", &json!({ "selectedCards": [2.5, "x", null, 4.0, true, "-3"] }));
        assert_eq!(r.selected_cards, vec![4, -3]);
    }

    #[test]
    fn stat_values_are_coerced() {
        let r = normalize(
            "k",
            &json!({ "values": { "vida": "12", "ataqueMelee": 3.5, "defensa": "abc", "velocidad": true } }),
        );
        let v = r.values.expect("values present");
        assert_eq!(v[&StatKey::Vida], 12.0);
        assert_eq!(v[&StatKey::AtaqueMelee], 3.5);
        assert_eq!(v[&StatKey::Defensa], 0.0);
        assert_eq!(v[&StatKey::Velocidad], 1.0);
        assert_eq!(v[&StatKey::RegenMana], 0.0);
        assert_eq!(v.len(), StatKey::ALL.len());
    }

    #[test]
    fn empty_values_object_counts_as_absent() {
        let r = normalize("k", &json!({ "values": {} }));
        assert_eq!(r.values, None);
        let r = normalize("k", &json!({ "values": "vida=3" }));
        assert_eq!(r.values, None);
    }
}

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub database_url: String,     // Realtime Database root, e.g. https://<project>.firebaseio.com
    pub scores_path: String,      // node holding the session records
    pub auth: Option<String>,     // database secret / ID token, sent as ?auth=
    pub timeout_secs: u64,
    pub top_n: usize,             // leaderboard rows; 0 = all players
    pub boss_labels: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "https://game2-55d0d-default-rtdb.firebaseio.com".to_string(),
            scores_path: "scores".to_string(),
            auth: None,
            timeout_secs: 15,
            top_n: 8,
            boss_labels: HashMap::new(),
        }
    }
}

impl Config {
    /// `config.toml` if present and valid, else defaults; then environment overrides.
    pub fn load() -> Self {
        let base = match std::fs::read_to_string("config.toml") {
            Ok(s) => Self::from_toml(&s),
            Err(_) => Self::default(),
        };
        base.with_env(|name| std::env::var(name).ok())
    }

    pub fn from_toml(s: &str) -> Self {
        toml::from_str(s).unwrap_or_else(|e| {
            vprintln!("config: ignoring config.toml ({})", e);
            Self::default()
        })
    }

    /// DATABASE_URL / DATABASE_AUTH win over the file.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(token) = var("DATABASE_AUTH").filter(|t| !t.trim().is_empty()) {
            self.auth = Some(token);
        }
        self
    }
}

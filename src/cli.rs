use std::path::PathBuf;

use crate::aggregator::{FrequencyField, TopN};
use crate::model::Difficulty;
use crate::stats::GroupBy;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Every chart of the dashboard.
    Report,
    Leaderboard { tier: Option<Difficulty>, top: Option<TopN> },
    Frequencies { field: FrequencyField },
    Cards,
    Stats { group_by: GroupBy, percent: bool },
    Player { name: String },
    Help,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cli {
    pub command: Command,
    pub input: Option<PathBuf>, // local snapshot instead of the remote store
    pub url: Option<String>,    // overrides config/env database_url
    pub out: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
}

pub fn parse() -> Result<Cli, String> {
    parse_from(std::env::args().skip(1))
}

pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, String> {
    let mut command: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut input: Option<PathBuf> = None;
    let mut url: Option<String> = None;
    let mut out: Option<PathBuf> = None;
    let mut json = false;
    let mut verbose = false;
    let mut help = false;
    let mut tier: Option<String> = None;
    let mut top: Option<String> = None;
    let mut field: Option<String> = None;
    let mut group: Option<String> = None;
    let mut percent = false;

    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().ok_or_else(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "--input" | "-i" => input = Some(PathBuf::from(value(&arg)?)),
            "--url" => url = Some(value(&arg)?),
            "--out" | "-o" => out = Some(PathBuf::from(value(&arg)?)),
            "--tier" | "--difficulty" => tier = Some(value(&arg)?),
            "--top" => top = Some(value(&arg)?),
            "--field" => field = Some(value(&arg)?),
            "--group" => group = Some(value(&arg)?),
            "--percent" => percent = true,
            "--json" => json = true,
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => help = true,
            s if s.starts_with('-') => return Err(format!("unknown option {}", s)),
            _ if command.is_none() => command = Some(arg),
            _ => positional.push(arg),
        }
    }

    let command = if help {
        Command::Help
    } else {
        match command.as_deref().unwrap_or("report") {
            "report" => Command::Report,
            "leaderboard" => Command::Leaderboard {
                tier: tier
                    .map(|t| Difficulty::parse(&t).ok_or_else(|| format!("unknown difficulty {}", t)))
                    .transpose()?,
                top: top
                    .map(|n| TopN::parse(&n).ok_or_else(|| format!("--top expects a count or \"all\", got {}", n)))
                    .transpose()?,
            },
            "frequencies" | "freq" => {
                let f = field.as_deref().unwrap_or("skills");
                Command::Frequencies {
                    field: FrequencyField::parse(f).ok_or_else(|| format!("unknown field {}", f))?,
                }
            }
            "cards" => Command::Cards,
            "stats" => {
                let g = group.as_deref().unwrap_or("difficulty");
                Command::Stats {
                    group_by: GroupBy::parse(g).ok_or_else(|| format!("unknown grouping {}", g))?,
                    percent,
                }
            }
            "player" => {
                let name = positional.join(" ");
                if name.trim().is_empty() {
                    return Err("player needs a name".to_string());
                }
                Command::Player { name }
            }
            "help" => Command::Help,
            other => return Err(format!("unknown command {}", other)),
        }
    };

    Ok(Cli { command, input, url, out, json, verbose })
}

pub fn print_help() {
    eprintln!(
r#"Score Dashboard

Usage:
  score-dashboard [report]                         every chart
  score-dashboard leaderboard [--tier T] [--top N|all]
  score-dashboard frequencies [--field skills|cards|first-boss]
  score-dashboard cards                            normal (1-10) / special (101-110) cards
  score-dashboard stats [--group difficulty|all] [--percent]
  score-dashboard player NAME

Options:
  --input, -i PATH   Read a local export (.json or .json.zst) instead of the database.
  --url URL          Database root URL (overrides DATABASE_URL and config.toml).
  --out, -o PATH     CSV output: a directory (one file per chart), or a file
                     when a single chart is produced.
  --json             Print chart payloads as JSON.
  -v, --verbose      Timings and source details on stderr.
  -h, --help         Show this help.

Notes:
  • database_url, scores_path, timeout_secs, top_n and [boss_labels] live in config.toml.
  • DATABASE_URL / DATABASE_AUTH (environment or .env) override the file.
"#);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Result<Cli, String> {
        parse_from(s.split_whitespace().map(str::to_string))
    }

    #[test]
    fn default_is_report() {
        let cli = args("").expect("parse");
        assert_eq!(cli.command, Command::Report);
        assert!(!cli.json);
    }

    #[test]
    fn leaderboard_options() {
        let cli = args("leaderboard --tier HARD --top all --json").expect("parse");
        assert_eq!(
            cli.command,
            Command::Leaderboard { tier: Some(Difficulty::Hard), top: Some(TopN::All) }
        );
        assert!(cli.json);
        assert!(args("leaderboard --tier nightmare").is_err());
        assert!(args("leaderboard --top 0").is_err());
    }

    #[test]
    fn player_name_may_have_spaces() {
        let cli = args("player Dark Knight -i dump.json.zst -v").expect("parse");
        assert_eq!(cli.command, Command::Player { name: "Dark Knight".to_string() });
        assert_eq!(cli.input, Some(PathBuf::from("dump.json.zst")));
        assert!(cli.verbose);
        assert!(args("player").is_err());
    }

    #[test]
    fn frequency_and_stats() {
        assert_eq!(
            args("frequencies --field first-boss").expect("parse").command,
            Command::Frequencies { field: FrequencyField::FirstBoss }
        );
        assert_eq!(
            args("stats --group all --percent").expect("parse").command,
            Command::Stats { group_by: GroupBy::Everyone, percent: true }
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(args("--out").is_err());
        assert!(args("--bogus").is_err());
        assert!(args("dance").is_err());
        assert_eq!(args("stats -h").expect("parse").command, Command::Help);
    }
}

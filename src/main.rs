#[macro_use]
mod verbose;

mod aggregator;
mod bosses;
mod chart;
mod cli;
mod config;
mod dashboard;
mod error;
mod model;
mod normalize;
mod profile;
mod source;
mod stats;

use std::io::Write;
use std::time::Instant;

use anyhow::Context;

use aggregator::{FrequencyField, TopN};
use bosses::BossNames;
use chart::ChartData;
use cli::Command;
use dashboard::Dashboard;
use error::SourceError;
use model::Difficulty;
use stats::GroupBy;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = match cli::parse() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("error: {}", msg);
            cli::print_help();
            std::process::exit(64);
        }
    };
    if args.command == Command::Help {
        cli::print_help();
        return Ok(());
    }
    verbose::set(args.verbose);

    let mut cfg = config::Config::load();
    // pick database_url: CLI override > env > config
    if let Some(url) = args.url.clone() {
        cfg.database_url = url;
    }

    let t0 = Instant::now();
    let raw = match args.input.as_deref() {
        Some(path) => source::load_snapshot(path).await,
        None => source::fetch_remote(&cfg).await,
    };
    let raw = match raw {
        Ok(r) => r,
        Err(e @ SourceError::Unavailable(_)) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("loading session records"),
    };
    let dash = Dashboard::from_raw(&raw, BossNames::new(&cfg.boss_labels));
    vprintln!("main: {} records loaded in {:.3}s", dash.records().len(), t0.elapsed().as_secs_f64());

    let default_top = if cfg.top_n == 0 { TopN::All } else { TopN::Limit(cfg.top_n) };
    let (message, charts) = build_charts(&dash, &args.command, default_top);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        chart::write_json(&mut out, dash.records().len(), message.as_deref(), &charts)?;
    } else {
        if dash.is_empty() {
            writeln!(out, "No session records found.")?;
        }
        if let Some(m) = message.as_deref() {
            writeln!(out, "{}\n", m)?;
        }
        chart::write_text(&mut out, &charts)?;
    }

    if let Some(path) = args.out.as_deref() {
        chart::write_csv(&charts, path)
            .with_context(|| format!("writing CSV to {}", path.display()))?;
    }
    Ok(())
}

fn build_charts(dash: &Dashboard, command: &Command, default_top: TopN) -> (Option<String>, Vec<ChartData>) {
    match command {
        Command::Report => {
            let mut charts: Vec<ChartData> = Difficulty::ALL
                .iter()
                .map(|t| chart::leaderboard_chart(*t, dash.leaderboard(*t, default_top).as_ref()))
                .collect();
            charts.push(skills_chart(dash));
            charts.extend(chart::card_charts(&dash.card_buckets()));
            let by_tier = dash.stat_distribution(GroupBy::Difficulty);
            charts.push(chart::stat_chart("stats-percent", "Stat distribution by difficulty (%)", &by_tier, true));
            charts.push(chart::stat_chart("stats-mean", "Average stats by difficulty", &by_tier, false));
            let everyone = dash.stat_distribution(GroupBy::Everyone);
            charts.push(chart::stat_chart("stats-all", "Average stats, all players", &everyone, false));
            charts.push(first_boss_chart(dash));
            (None, charts)
        }
        Command::Leaderboard { tier, top } => {
            let top = top.unwrap_or(default_top);
            let tiers: Vec<Difficulty> = match tier {
                Some(t) => vec![*t],
                None => Difficulty::ALL.to_vec(),
            };
            let charts = tiers
                .into_iter()
                .map(|t| chart::leaderboard_chart(t, dash.leaderboard(t, top).as_ref()))
                .collect();
            (None, charts)
        }
        Command::Frequencies { field } => {
            let chart = match field {
                FrequencyField::Skills => skills_chart(dash),
                FrequencyField::FirstBoss => first_boss_chart(dash),
                FrequencyField::Cards => chart::frequency_chart(
                    "cards",
                    "Card usage",
                    "Times selected",
                    &dash.frequencies(FrequencyField::Cards),
                ),
            };
            (None, vec![chart])
        }
        Command::Cards => (None, chart::card_charts(&dash.card_buckets())),
        Command::Stats { group_by, percent } => {
            let dist = dash.stat_distribution(*group_by);
            let (id, title) = match (group_by, percent) {
                (GroupBy::Difficulty, true) => ("stats-percent", "Stat distribution by difficulty (%)"),
                (GroupBy::Difficulty, false) => ("stats-mean", "Average stats by difficulty"),
                (GroupBy::Everyone, true) => ("stats-all-percent", "Stat distribution, all players (%)"),
                (GroupBy::Everyone, false) => ("stats-all", "Average stats, all players"),
            };
            (None, vec![chart::stat_chart(id, title, &dist, *percent)])
        }
        Command::Player { name } => {
            let (message, charts) = chart::player_charts(name, &dash.player_profile(name));
            (Some(message), charts)
        }
        Command::Help => (None, Vec::new()),
    }
}

fn skills_chart(dash: &Dashboard) -> ChartData {
    chart::frequency_chart("skills", "Skill usage", "Times used", &dash.frequencies(FrequencyField::Skills))
}

fn first_boss_chart(dash: &Dashboard) -> ChartData {
    chart::frequency_chart(
        "first-boss",
        "Toughest boss (first one left standing)",
        "Sessions lost",
        &dash.frequencies(FrequencyField::FirstBoss),
    )
}

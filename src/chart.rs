//! Renderer-ready chart payloads built from the aggregation views, plus the
//! text / JSON / CSV writers the CLI uses to hand them over.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::aggregator::{CardBuckets, FrequencyEntry, Leaderboard};
use crate::model::{Difficulty, StatKey};
use crate::profile::{PlayerProfile, ProfileLookup};
use crate::stats::{AxisHint, StatDistribution};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    /// Stable identifier, used for CSV file names.
    pub id: String,
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<AxisHint>,
}

impl ChartData {
    fn empty(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: format!("{} (no data)", title.into()),
            labels: Vec::new(),
            series: Vec::new(),
            axis: None,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.labels.is_empty() && !self.series.is_empty()
    }
}

pub fn leaderboard_chart(tier: Difficulty, lb: Option<&Leaderboard>) -> ChartData {
    let id = format!("leaderboard-{}", tier.as_str());
    let Some(lb) = lb else {
        return ChartData::empty(id, tier.title());
    };
    ChartData {
        id,
        title: format!(
            "{} | mean: {:.2}, best: {} ({})",
            tier, lb.mean_defeated, lb.best_player, lb.best_value
        ),
        labels: lb.top.iter().map(|p| p.name.clone()).collect(),
        series: vec![Series {
            label: "Bosses defeated".to_string(),
            data: lb.top.iter().map(|p| p.defeated as f64).collect(),
        }],
        axis: None,
    }
}

pub fn frequency_chart(id: &str, title: &str, series_label: &str, entries: &[FrequencyEntry]) -> ChartData {
    if entries.is_empty() {
        return ChartData::empty(id, title);
    }
    ChartData {
        id: id.to_string(),
        title: title.to_string(),
        labels: entries.iter().map(|e| e.label.clone()).collect(),
        series: vec![Series {
            label: series_label.to_string(),
            data: entries.iter().map(|e| e.count as f64).collect(),
        }],
        axis: None,
    }
}

pub fn card_charts(buckets: &CardBuckets) -> Vec<ChartData> {
    vec![
        frequency_chart("cards-normal", "Normal cards", "Times selected", &buckets.normal),
        frequency_chart("cards-special", "Special cards", "Times selected", &buckets.special),
    ]
}

/// Radar payload: one series per group over the stat keys.
pub fn stat_chart(id: &str, title: &str, dist: &StatDistribution, percent: bool) -> ChartData {
    if dist.is_empty() {
        return ChartData::empty(id, title);
    }
    let series: Vec<Series> = dist
        .groups
        .iter()
        .filter_map(|(key, g)| {
            let vector = if percent { g.percentages.as_ref()? } else { &g.mean };
            Some(Series {
                label: key.to_string(),
                data: StatKey::ALL
                    .iter()
                    .map(|k| vector.get(k).copied().unwrap_or(0.0))
                    .collect(),
            })
        })
        .collect();
    if series.is_empty() {
        return ChartData::empty(id, title);
    }
    ChartData {
        id: id.to_string(),
        title: title.to_string(),
        labels: StatKey::ALL.iter().map(|k| k.field().to_string()).collect(),
        series,
        axis: if percent { dist.percentage_axis() } else { dist.mean_axis() },
    }
}

pub fn player_charts(query: &str, lookup: &ProfileLookup) -> (String, Vec<ChartData>) {
    match lookup {
        ProfileLookup::NotFound => (format!("No records found for \"{}\".", query.trim()), Vec::new()),
        ProfileLookup::NoStats(p) => (
            format!("Player \"{}\" found, but without recorded stat values. {}", p.name, played(p)),
            profile_tables(p),
        ),
        ProfileLookup::Found(p) => {
            let mut charts = vec![
                stat_chart("player-stats", "Player stat distribution (%)", &p.overall, true),
                stat_chart("player-stats-tier", "Player stat distribution by difficulty (%)", &p.stats_by_tier, true),
            ];
            charts.extend(profile_tables(p));
            (format!("Player \"{}\" | {}", p.name, played(p)), charts)
        }
    }
}

fn played(p: &PlayerProfile) -> String {
    let mut tiers: Vec<String> = p.difficulties_played.iter().map(|d| d.to_string()).collect();
    if p.unknown_difficulty_sessions > 0 {
        tiers.push("unknown".to_string());
    }
    format!("difficulties played: {}", tiers.join(", "))
}

fn profile_tables(p: &PlayerProfile) -> Vec<ChartData> {
    let labels: Vec<String> = p.per_difficulty.keys().map(|d| d.to_string()).collect();
    let summary = if labels.is_empty() {
        ChartData::empty("player-tiers", "Average bosses defeated")
    } else {
        ChartData {
            id: "player-tiers".to_string(),
            title: "Average bosses defeated".to_string(),
            labels,
            series: vec![
                Series {
                    label: "Average defeated".to_string(),
                    data: p.per_difficulty.values().map(|t| t.avg_defeated as f64).collect(),
                },
                Series {
                    label: "Sessions".to_string(),
                    data: p.per_difficulty.values().map(|t| t.sessions as f64).collect(),
                },
            ],
            axis: None,
        }
    };
    vec![
        summary,
        frequency_chart("player-skills", "Player skill usage", "Times used", &p.skills),
        frequency_chart("player-first-boss", "Player toughest boss", "Sessions lost", &p.first_bosses),
    ]
}

/// Plain-text tables, one block per chart.
pub fn write_text<W: Write>(out: &mut W, charts: &[ChartData]) -> io::Result<()> {
    for chart in charts {
        writeln!(out, "== {}", chart.title)?;
        if !chart.has_data() {
            writeln!(out)?;
            continue;
        }
        let width = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(5);
        write!(out, "{:<width$}", "", width = width)?;
        for s in &chart.series {
            write!(out, "  {:>12}", s.label)?;
        }
        writeln!(out)?;
        for (i, label) in chart.labels.iter().enumerate() {
            write!(out, "{:<width$}", label, width = width)?;
            for s in &chart.series {
                write!(out, "  {:>12}", format_value(s.data.get(i).copied().unwrap_or(0.0)))?;
            }
            writeln!(out)?;
        }
        if let Some(axis) = chart.axis {
            writeln!(out, "(axis max {}, step {})", axis.max, axis.step)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    generated_at: String,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    charts: &'a [ChartData],
}

pub fn write_json<W: Write>(out: &mut W, records: usize, message: Option<&str>, charts: &[ChartData]) -> io::Result<()> {
    let envelope = Envelope {
        generated_at: chrono::Utc::now().to_rfc3339(),
        records,
        message,
        charts,
    };
    serde_json::to_writer_pretty(&mut *out, &envelope)?;
    writeln!(out)
}

/// One CSV per chart: `out` is a directory (created if missing) or, for a
/// single chart, a file path.
pub fn write_csv(charts: &[ChartData], out: &Path) -> io::Result<()> {
    let single_file = charts.len() == 1 && out.extension().is_some() && !out.is_dir();
    if single_file {
        return write_chart_csv(&charts[0], out);
    }
    fs::create_dir_all(out)?;
    for chart in charts.iter().filter(|c| c.has_data()) {
        let path = out.join(format!("{}.csv", chart.id));
        vprintln!("csv: writing {}", path.display());
        write_chart_csv(chart, &path)?;
    }
    Ok(())
}

fn write_chart_csv(chart: &ChartData, path: &Path) -> io::Result<()> {
    let mut f = File::create(path)?;
    let header: Vec<String> = std::iter::once("label".to_string())
        .chain(chart.series.iter().map(|s| escape_csv(&s.label)))
        .collect();
    writeln!(f, "{}", header.join(","))?;
    for (i, label) in chart.labels.iter().enumerate() {
        let mut row = vec![escape_csv(label)];
        for s in &chart.series {
            row.push(format!("{:.3}", s.data.get(i).copied().unwrap_or(0.0)));
        }
        writeln!(f, "{}", row.join(","))?;
    }
    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

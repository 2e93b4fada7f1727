use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::task;

use crate::config::Config;
use crate::error::SourceError;

/// Raw record payloads keyed by the store's record key, in key order.
pub type RawRecords = Vec<(String, Value)>;

/// REST location of the scores node: `{database_url}/{scores_path}.json`.
pub fn scores_url(cfg: &Config) -> String {
    format!(
        "{}/{}.json",
        cfg.database_url.trim_end_matches('/'),
        cfg.scores_path.trim_matches('/')
    )
}

/// Read the whole collection from the hosted database.
pub async fn fetch_remote(cfg: &Config) -> Result<RawRecords, SourceError> {
    let url = scores_url(cfg);
    let auth = cfg.auth.clone();
    let timeout = Duration::from_secs(cfg.timeout_secs.max(1));

    task::spawn_blocking(move || -> Result<RawRecords, SourceError> {
        vprintln!("source: GET {}", url);
        let t0 = Instant::now();
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        let mut req = client.get(&url);
        if let Some(token) = auth.as_deref() {
            req = req.query(&[("auth", token)]);
        }
        let text = req.send()?.error_for_status()?.text()?;
        vprintln!("source: fetched in {:.3}s ({} bytes)", t0.elapsed().as_secs_f64(), text.len());

        let body: Value = serde_json::from_str(&text)?;
        collection_from_json(body)
    })
    .await
    .map_err(|e| SourceError::Unavailable(format!("fetch task failed: {}", e)))?
}

/// Load a local export: plain JSON, or zstd-compressed when the name ends in `.zst`.
pub async fn load_snapshot(path: &Path) -> Result<RawRecords, SourceError> {
    let path: PathBuf = path.to_path_buf();
    task::spawn_blocking(move || read_snapshot(&path))
        .await
        .map_err(|e| SourceError::Unavailable(format!("snapshot task failed: {}", e)))?
}

fn read_snapshot(path: &Path) -> Result<RawRecords, SourceError> {
    vprintln!("source: reading {}", path.display());
    let t0 = Instant::now();
    let file = File::open(path)
        .map_err(|e| SourceError::Unavailable(format!("{}: {}", path.display(), e)))?;

    let compressed = path.extension().and_then(|e| e.to_str()) == Some("zst");
    let mut text = String::new();
    if compressed {
        let mut decoder = zstd::stream::Decoder::new(file)?;
        decoder
            .read_to_string(&mut text)
            .map_err(|e| SourceError::Malformed(format!("{}: {}", path.display(), e)))?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }
    vprintln!("source: {} bytes read in {:.3}s", text.len(), t0.elapsed().as_secs_f64());

    let body: Value = serde_json::from_str(&text)?;
    // full database exports wrap the collection in a "scores" node
    let body = match body {
        Value::Object(mut root) if matches!(root.get("scores"), Some(Value::Object(_))) => {
            root.remove("scores").unwrap_or(Value::Null)
        }
        other => other,
    };
    collection_from_json(body)
}

/// `null` is an empty collection; objects map key -> record; arrays (the store's
/// rendering of integer keys) map index -> record with holes skipped.
pub fn collection_from_json(body: Value) -> Result<RawRecords, SourceError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect()),
        other => Err(SourceError::Malformed(format!(
            "expected an object of records, got {}",
            kind(&other)
        ))),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Reader for the cleaned review table.
//!
//! The table is a headered CSV export of the review dump. Only the projected
//! columns below are read; anything else in the file is ignored:
//!
//! | column                    | field                             |
//! |---------------------------|-----------------------------------|
//! | `app_id`                  | [`InteractionRecord::item_id`]    |
//! | `app_name`                | [`InteractionRecord::item_name`]  |
//! | `review_id`               | [`InteractionRecord::review_id`]  |
//! | `language`                | [`InteractionRecord::language`]   |
//! | `author.steamid`          | [`InteractionRecord::actor_id`]   |
//! | `timestamp_created`       | [`InteractionRecord::timestamp`]  |
//! | `author.playtime_forever` | [`InteractionRecord::playtime`]   |
//! | `recommended`             | [`InteractionRecord::recommended`]|

use crate::error::{DataLoadError, Result};
use crate::types::InteractionRecord;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

/// Column layout of one review row as it appears in the export
#[derive(Debug, Deserialize)]
struct ReviewRow {
    app_id: u32,
    app_name: String,
    review_id: u64,
    #[serde(default)]
    language: String,
    #[serde(rename = "author.steamid")]
    author_steamid: u64,
    timestamp_created: i64,
    #[serde(rename = "author.playtime_forever")]
    author_playtime_forever: f64,
    #[serde(default)]
    recommended: Option<String>,
}

/// Read every review in the CSV file at `path`.
pub fn read_reviews(path: &Path) -> Result<Vec<InteractionRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let records = parse_reviews(file, &file_name)?;
    info!("Read {} reviews from {}", records.len(), path.display());
    Ok(records)
}

/// Read reviews from any CSV source, e.g. an in-memory buffer.
///
/// `source_name` only appears in error messages.
pub fn read_reviews_from<R: Read>(reader: R, source_name: &str) -> Result<Vec<InteractionRecord>> {
    parse_reviews(reader, source_name)
}

fn parse_reviews<R: Read>(reader: R, source_name: &str) -> Result<Vec<InteractionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DataLoadError::ParseError {
            file: source_name.to_string(),
            line: 1,
            reason: format!("Failed to read headers: {e}"),
        })?
        .clone();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| DataLoadError::ParseError {
            file: source_name.to_string(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        })?;
        let line_no = row.position().map(|p| p.line()).unwrap_or(0);

        let review: ReviewRow =
            row.deserialize(Some(&headers))
                .map_err(|e| DataLoadError::ParseError {
                    file: source_name.to_string(),
                    line: line_no,
                    reason: e.to_string(),
                })?;

        let recommended = match review.recommended.as_deref() {
            None => None,
            Some(flag) => parse_flag(flag).map_err(|reason| DataLoadError::ParseError {
                file: source_name.to_string(),
                line: line_no,
                reason,
            })?,
        };

        records.push(InteractionRecord {
            item_id: review.app_id,
            item_name: review.app_name,
            review_id: review.review_id,
            language: review.language,
            actor_id: review.author_steamid,
            timestamp: review.timestamp_created,
            playtime: review.author_playtime_forever,
            recommended,
        });
    }

    Ok(records)
}

/// Parse the recommendation flag.
///
/// Exports disagree on spelling, so `true`/`True`/`1` and `false`/`False`/`0`
/// are all accepted. An empty cell means the flag is absent.
fn parse_flag(s: &str) -> std::result::Result<Option<bool>, String> {
    match s.trim() {
        "" => Ok(None),
        "true" | "True" | "TRUE" | "1" => Ok(Some(true)),
        "false" | "False" | "FALSE" | "0" => Ok(Some(false)),
        other => Err(format!("Invalid recommended flag: {other}")),
    }
}

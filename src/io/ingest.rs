//! CSV ingest and normalization.
//!
//! This module turns a long-format sample-count CSV (one row per constituency
//! and party) into a [`ProjectionInput`].
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened); a
//!   constituency that lost any row is rejected rather than resolved on the rest
//! - **Deterministic behavior** (constituencies keep first-appearance order)
//! - **Separation of concerns**: no estimation logic here; proportion sums and
//!   sampling-design checks belong to the pipeline

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Constituency, PartySample, PendingConstituency, ProjectionInput, RejectedConstituency};
use crate::error::AppError;

/// Canonical column names and accepted aliases (after header normalization).
const COLUMNS: &[(&str, &[&str])] = &[
    ("constituency", &["constituency", "name"]),
    ("seats", &["seats"]),
    (
        "polling_stations",
        &["polling_stations", "stations", "unique_polling_stations"],
    ),
    ("registered_voters", &["registered_voters", "voters"]),
    ("party", &["party"]),
    ("sample_pct", &["sample_pct", "sample_count", "sample"]),
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub constituency: Option<String>,
    pub message: String,
}

/// Ingest output: projection input + row errors + counters.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub input: ProjectionInput,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

#[derive(Debug, Clone)]
struct SampleRow {
    constituency: String,
    seats: u32,
    polling_stations: u64,
    registered_voters: u64,
    party: Option<String>,
    /// Proportion in `[0, 1]`; `None` while the sample count is unreleased.
    proportion: Option<f64>,
}

#[derive(Debug, Clone)]
struct ConstituencyBuilder {
    name: String,
    seats: u32,
    polling_stations: u64,
    registered_voters: u64,
    samples: Vec<PartySample>,
    pending: bool,
}

/// Load a sample-count CSV from disk.
pub fn load_constituencies(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_constituencies(file)
}

/// Parse a sample-count CSV from any reader.
pub fn read_constituencies<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut builders: Vec<ConstituencyBuilder> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_used = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    constituency: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let row = match parse_row(&record, &header_map) {
            Ok(row) => row,
            Err(message) => {
                row_errors.push(RowError {
                    line,
                    constituency: get_optional(&record, &header_map, "constituency").map(str::to_string),
                    message,
                });
                continue;
            }
        };

        match merge_row(&mut builders, &mut index, row) {
            Ok(()) => rows_used += 1,
            Err((constituency, message)) => row_errors.push(RowError {
                line,
                constituency: Some(constituency),
                message,
            }),
        }
    }

    for err in &row_errors {
        log::warn!(
            "Skipping CSV line {}{}: {}",
            err.line,
            err.constituency
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default(),
            err.message
        );
    }

    if builders.is_empty() {
        return Err(AppError::new(3, "No valid rows remain after validation."));
    }

    // Constituencies that lost a row are rejected whole.
    let mut rejected_lines: HashMap<&str, Vec<usize>> = HashMap::new();
    for err in &row_errors {
        if let Some(name) = err.constituency.as_deref() {
            rejected_lines.entry(name).or_default().push(err.line);
        }
    }

    let mut input = ProjectionInput::default();
    for b in builders {
        if let Some(lines) = rejected_lines.get(b.name.as_str()) {
            input.rejected.push(RejectedConstituency {
                reason: rejected_reason(lines),
                name: b.name,
                seats: b.seats,
            });
        } else if b.pending {
            input.pending.push(PendingConstituency {
                name: b.name,
                seats: b.seats,
            });
        } else {
            input.constituencies.push(Constituency {
                name: b.name,
                seats: b.seats,
                polling_stations: b.polling_stations,
                registered_voters: b.registered_voters,
                samples: b.samples,
            });
        }
    }

    log::debug!(
        "Ingested {} sampled, {} pending and {} rejected constituencies from {rows_used}/{rows_read} rows",
        input.constituencies.len(),
        input.pending.len(),
        input.rejected.len()
    );

    Ok(IngestedData {
        input,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn rejected_reason(lines: &[usize]) -> String {
    let list: Vec<String> = lines.iter().map(usize::to_string).collect();
    match lines {
        [_] => format!("input row rejected (line {})", list.join(", ")),
        _ => format!("{} input rows rejected (lines {})", lines.len(), list.join(", ")),
    }
}

fn merge_row(
    builders: &mut Vec<ConstituencyBuilder>,
    index: &mut HashMap<String, usize>,
    row: SampleRow,
) -> Result<(), (String, String)> {
    if row.party.is_none() && row.proportion.is_some() {
        return Err((row.constituency, "Missing required value: `party`".to_string()));
    }

    let existing = index.get(&row.constituency).copied();
    let slot = match existing {
        Some(i) => {
            let b = &builders[i];
            if b.seats != row.seats
                || b.polling_stations != row.polling_stations
                || b.registered_voters != row.registered_voters
            {
                return Err((
                    row.constituency,
                    format!(
                        "seats/stations/voters ({}/{}/{}) disagree with earlier rows ({}/{}/{})",
                        row.seats,
                        row.polling_stations,
                        row.registered_voters,
                        b.seats,
                        b.polling_stations,
                        b.registered_voters
                    ),
                ));
            }
            i
        }
        None => {
            builders.push(ConstituencyBuilder {
                name: row.constituency.clone(),
                seats: row.seats,
                polling_stations: row.polling_stations,
                registered_voters: row.registered_voters,
                samples: Vec::new(),
                pending: false,
            });
            index.insert(row.constituency.clone(), builders.len() - 1);
            builders.len() - 1
        }
    };

    let b = &mut builders[slot];
    match (row.party, row.proportion) {
        (Some(party), Some(p)) => b.samples.push(PartySample::new(party.as_str(), p)),
        _ => b.pending = true,
    }
    Ok(())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let raw: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    // Resolve aliases to canonical names; the first alias present wins.
    let mut map = HashMap::new();
    for (canonical, aliases) in COLUMNS {
        if let Some(idx) = aliases.iter().find_map(|a| raw.get(*a)) {
            map.insert(canonical.to_string(), *idx);
        }
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace([' ', '-'], "_")
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for (canonical, aliases) in COLUMNS {
        if !header_map.contains_key(*canonical) {
            return Err(AppError::new(
                2,
                format!(
                    "Missing required column: `{canonical}` (accepted names: {})",
                    aliases.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SampleRow, String> {
    let constituency = get_required(record, header_map, "constituency")?.to_string();
    let seats = parse_count(get_required(record, header_map, "seats")?, "seats")?;
    let seats = u32::try_from(seats).map_err(|_| format!("Seat count {seats} is out of range."))?;
    let polling_stations = parse_count(get_required(record, header_map, "polling_stations")?, "polling_stations")?;
    let registered_voters = parse_count(get_required(record, header_map, "registered_voters")?, "registered_voters")?;
    let party = get_optional(record, header_map, "party").map(str::to_string);

    let proportion = match get_optional(record, header_map, "sample_pct") {
        None => None,
        Some(s) => Some(parse_percentage(s)?),
    };

    Ok(SampleRow {
        constituency,
        seats,
        polling_stations,
        registered_voters,
        party,
        proportion,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a positive integer count; thousands separators are tolerated.
fn parse_count(s: &str, column: &str) -> Result<u64, String> {
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
    let v = cleaned
        .parse::<u64>()
        .map_err(|_| format!("Invalid `{column}` value '{s}': expected a whole number."))?;
    if v == 0 {
        return Err(format!("`{column}` must be >= 1."));
    }
    Ok(v)
}

/// Parse a published sample percentage (e.g. `59` or `59%`) into a proportion.
fn parse_percentage(s: &str) -> Result<f64, String> {
    let v = s
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid `sample_pct` value '{s}'."))?;
    if !(v.is_finite() && (0.0..=100.0).contains(&v)) {
        return Err(format!("`sample_pct` value {v} is outside 0-100."));
    }
    Ok(v / 100.0)
}

//! Query-string handoff from the address planner to the patch sheet.

use std::collections::HashMap;

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::patch_sheet::{index_width, pad_number, FixtureSpec, PatchRow};
use crate::address::clamp_int;

/// A placed fixture as carried in the `import` query parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedPatchRow {
    pub name: String,
    pub channels: u32,
    pub universe: u32,
    pub address: u32,
}

/// Decoded handoff: the fixture list to prefill and the rows to show as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchImport {
    pub fixtures: Vec<FixtureSpec>,
    pub rows: Vec<PatchRow>,
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("import parameter is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("import parameter is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("import parameter must be a JSON array")]
    NotAnArray,

    #[error("import parameter contains no rows")]
    Empty,
}

pub fn encode_handoff(rows: &[ImportedPatchRow]) -> Result<String, HandoffError> {
    let json = serde_json::to_vec(rows)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_handoff(param: &str, fallback_name: &str) -> Result<PatchImport, HandoffError> {
    let trimmed = param.trim().trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(HandoffError::Empty);
    }

    let bytes = if trimmed.contains(['+', '/']) {
        STANDARD_NO_PAD.decode(trimmed)?
    } else {
        URL_SAFE_NO_PAD.decode(trimmed)?
    };

    let Value::Array(values) = serde_json::from_slice::<Value>(&bytes)? else {
        return Err(HandoffError::NotAnArray);
    };

    let mut rows: Vec<ImportedPatchRow> = values
        .iter()
        .filter_map(|value| parse_row(value, fallback_name))
        .collect();
    if rows.is_empty() {
        return Err(HandoffError::Empty);
    }

    // Fixture lines keep payload order; only the rows are sorted.
    let fixtures = group_fixtures(&rows);
    rows.sort_by_key(|row| (row.universe, row.address));
    Ok(PatchImport {
        fixtures,
        rows: number_rows(&rows),
    })
}

/// Rows without a string `name` are dropped; numbers are floored to at least 1.
fn parse_row(value: &Value, fallback_name: &str) -> Option<ImportedPatchRow> {
    let name = value.get("name")?.as_str()?.trim();
    let number = |key: &str| clamp_int(value.get(key).and_then(Value::as_f64).unwrap_or(1.0), 1);

    Some(ImportedPatchRow {
        name: if name.is_empty() {
            fallback_name.to_string()
        } else {
            name.to_string()
        },
        channels: number("channels"),
        universe: number("universe"),
        address: number("address"),
    })
}

/// One fixture line per distinct name and channel count, in first-seen order.
fn group_fixtures(rows: &[ImportedPatchRow]) -> Vec<FixtureSpec> {
    let mut fixtures: Vec<FixtureSpec> = Vec::new();
    for row in rows {
        match fixtures
            .iter_mut()
            .find(|f| f.name == row.name && f.channel_count == row.channels)
        {
            Some(fixture) => fixture.quantity += 1,
            None => fixtures.push(FixtureSpec::new(&row.name, row.channels, 1)),
        }
    }
    fixtures
}

/// Rows with running per-name indices, in the order given.
fn number_rows(rows: &[ImportedPatchRow]) -> Vec<PatchRow> {
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for row in rows {
        *totals.entry(row.name.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, u32> = HashMap::new();
    rows
        .iter()
        .map(|row| {
            let index = seen.entry(row.name.as_str()).or_default();
            *index += 1;
            let width = index_width(totals.get(row.name.as_str()).copied().unwrap_or(1));
            let index_label = pad_number(*index, width);
            PatchRow {
                fixture_label: format!("{} {}", row.name, index_label),
                fixture_name: row.name.clone(),
                index_label,
                universe: row.universe,
                address: row.address,
                address_label: pad_number(row.address, 3),
                channels: row.channels,
            }
        })
        .collect()
}

//! Generic CSV ingestion for uploaded datasets.
//!
//! Column order and exact header names are not fixed across uploads, so
//! rows are kept as dynamically typed cells and consumers locate columns
//! through the role-inference table below.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;

/// A single parsed cell. Empty cells become `Null`; numeric-looking cells
/// become `Number`; everything else stays text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display form used for axis labels and grouping keys.
    pub fn label(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Text(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// An ingested file: ordered headers and rows of cells, each row padded or
/// truncated to the header width so every column stays index-aligned.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows the CSV reader could not decode. Reported to the user, never fatal.
    pub skipped: usize,
}

impl Table {
    /// Case-insensitive exact header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads a delimited file with a header row into a [`Table`].
///
/// Rows that cannot be decoded are skipped and counted; a file whose header
/// cannot be read at all is a parse failure surfaced to the caller.
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in rdr.records().enumerate() {
        match record {
            Ok(rec) => {
                let mut cells: Vec<Value> = rec.iter().map(Value::parse).collect();
                cells.resize(width, Value::Null);
                rows.push(cells);
            }
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping unreadable row");
                skipped += 1;
            }
        }
    }

    Ok(Table {
        headers,
        rows,
        skipped,
    })
}

/// Semantic role a column can play in the epidemiological and sensor views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Timestamp,
    Location,
    Confirmed,
    Recovered,
    Deaths,
}

/// One name-matching rule: a header containing any of the needles
/// (case-insensitively) plays the role.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub role: ColumnRole,
    pub needles: &'static [&'static str],
}

/// Ordered rule table; earlier rules claim columns first.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        role: ColumnRole::Timestamp,
        needles: &["date", "time"],
    },
    RoleRule {
        role: ColumnRole::Location,
        needles: &["location", "place"],
    },
    RoleRule {
        role: ColumnRole::Confirmed,
        needles: &["confirm", "cases"],
    },
    RoleRule {
        role: ColumnRole::Recovered,
        needles: &["recover"],
    },
    RoleRule {
        role: ColumnRole::Deaths,
        needles: &["death", "dead"],
    },
];

/// Column indices resolved per role for one header row.
#[derive(Debug, Default)]
pub struct RoleMap {
    indices: HashMap<ColumnRole, usize>,
}

impl RoleMap {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.indices.get(&role).copied()
    }

    /// Resolved index, or the positional fallback when no header matched.
    /// The fallback only applies if the table is wide enough.
    pub fn get_or_position(&self, role: ColumnRole, fallback: usize, width: usize) -> Option<usize> {
        self.get(role).or((fallback < width).then_some(fallback))
    }
}

/// Assigns roles to headers by scanning [`ROLE_RULES`] in priority order.
/// Each rule claims the first unclaimed header containing one of its needles.
pub fn infer_roles(headers: &[String]) -> RoleMap {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let mut claimed = vec![false; headers.len()];
    let mut indices = HashMap::new();

    for rule in ROLE_RULES {
        let found = lowered.iter().enumerate().find(|(i, h)| {
            !claimed[*i] && rule.needles.iter().any(|needle| h.contains(needle))
        });
        if let Some((i, _)) = found {
            claimed[i] = true;
            indices.insert(rule.role, i);
        }
    }

    RoleMap { indices }
}

/// Lenient calendar-date parsing for ingested rows: ISO date, ISO datetime
/// with a space or `T` separator, or `M/D/Y`. Anything else is `None` and
/// the row is skipped by the caller.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

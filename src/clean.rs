//! Validation and deduplication for the employee roster dataset.

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// One row as it appears in the uploaded file. Numeric fields stay raw
/// strings here so a non-numeric salary rejects the row instead of aborting
/// the whole file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEmployee {
    #[serde(rename = "EmployeeID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PhoneNumber")]
    pub phone: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "ExperienceYears")]
    pub experience_years: String,
}

/// A record that passed every rule, numeric fields coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub department: String,
    pub salary: f64,
    pub experience_years: f64,
}

/// Per-rule rejection counts, surfaced as the user-visible status line.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub duplicate_id: usize,
    pub bad_phone: usize,
    pub bad_salary: usize,
    pub bad_experience: usize,
}

/// Exactly 10 digits, leading digit 6 through 9.
fn valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 10
        && matches!(bytes[0], b'6'..=b'9')
        && bytes.iter().all(u8::is_ascii_digit)
}

/// Applies the cleaning rules in order: duplicate id (first occurrence
/// wins), phone pattern, positive salary, non-negative experience. Rows are
/// never mutated; survivors keep their relative input order.
pub fn clean_employees(rows: &[RawEmployee]) -> (Vec<Employee>, CleanReport) {
    let mut report = CleanReport {
        input_rows: rows.len(),
        ..CleanReport::default()
    };
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut cleaned = Vec::new();

    for row in rows {
        if !seen_ids.insert(&row.id) {
            debug!(id = %row.id, "Dropping duplicate employee id");
            report.duplicate_id += 1;
            continue;
        }
        if !valid_phone(&row.phone) {
            debug!(id = %row.id, phone = %row.phone, "Dropping invalid phone");
            report.bad_phone += 1;
            continue;
        }
        let salary = match row.salary.trim().parse::<f64>() {
            Ok(s) if s > 0.0 => s,
            _ => {
                debug!(id = %row.id, salary = %row.salary, "Dropping non-positive salary");
                report.bad_salary += 1;
                continue;
            }
        };
        let experience_years = match row.experience_years.trim().parse::<f64>() {
            Ok(e) if e >= 0.0 => e,
            _ => {
                debug!(id = %row.id, "Dropping negative or non-numeric experience");
                report.bad_experience += 1;
                continue;
            }
        };

        cleaned.push(Employee {
            id: row.id.clone(),
            name: row.name.clone(),
            phone: row.phone.clone(),
            department: row.department.clone(),
            salary,
            experience_years,
        });
    }

    report.output_rows = cleaned.len();
    (cleaned, report)
}

/// Reads the employee CSV, skipping rows that fail to deserialize.
pub fn read_employees<R: Read>(reader: R) -> Result<Vec<RawEmployee>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<RawEmployee>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(line = line + 2, error = %e, "Skipping malformed employee row"),
        }
    }
    Ok(rows)
}

//! # Lookup Tables
//!
//! Constants that are either fixed for a domain or keyed by one of its
//! choice fields. Every option of the keyed field must have an entry;
//! `DomainConfig::validate` enforces that when the domain is defined, and a
//! lookup that still misses returns [`CalcError::MissingTableEntry`] instead
//! of falling back to a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::inputs::{FieldSpec, InputSet};

/// A scalar that is fixed or selected by a choice field.
///
/// ```json
/// { "source": "ByChoice", "field": "material", "table": { "Asphalt": 145.0, "Gravel": 105.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum Rate {
    Fixed { value: f64 },
    ByChoice { field: String, table: BTreeMap<String, f64> },
    /// A price or rate the user enters directly
    FromField { field: String },
}

impl Rate {
    pub fn fixed(value: f64) -> Self {
        Rate::Fixed { value }
    }

    pub fn by_choice(field: &str, entries: &[(&str, f64)]) -> Self {
        Rate::ByChoice {
            field: field.to_string(),
            table: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// Look up the value for the current inputs
    pub fn resolve(&self, inputs: &InputSet) -> CalcResult<f64> {
        match self {
            Rate::Fixed { value } => Ok(*value),
            Rate::ByChoice { field, table } => {
                let key = inputs.choice(field)?;
                table
                    .get(key)
                    .copied()
                    .ok_or_else(|| CalcError::missing_table_entry(field, key))
            }
            Rate::FromField { field } => inputs.canonical(field),
        }
    }

    /// Every value the rate can take
    pub fn values(&self) -> Vec<f64> {
        match self {
            Rate::Fixed { value } => vec![*value],
            Rate::ByChoice { table, .. } => table.values().copied().collect(),
            Rate::FromField { .. } => vec![],
        }
    }

    /// Check the table covers every option of its key field.
    ///
    /// Returns a description of the first problem found.
    pub fn coverage_problem(&self, schema: &[FieldSpec]) -> Option<String> {
        let (field, table) = match self {
            Rate::Fixed { .. } => return None,
            Rate::FromField { field } => {
                return match schema.iter().find(|s| &s.key == field) {
                    Some(spec) if matches!(spec.kind.name(), "number" | "measure") => None,
                    Some(_) => Some(format!("rate reads non-numeric field '{field}'")),
                    None => Some(format!("rate reads undeclared field '{field}'")),
                };
            }
            Rate::ByChoice { field, table } => (field, table),
        };
        let Some(spec) = schema.iter().find(|s| &s.key == field) else {
            return Some(format!("table keyed by undeclared field '{field}'"));
        };
        let options = spec.options();
        if options.is_empty() {
            return Some(format!("table keyed by non-choice field '{field}'"));
        }
        if let Some(missing) = options.iter().find(|o| !table.contains_key(*o)) {
            return Some(format!("table for '{field}' has no entry for '{missing}'"));
        }
        if let Some(extra) = table.keys().find(|k| !options.contains(k)) {
            return Some(format!("table for '{field}' has entry '{extra}' that is not an option"));
        }
        None
    }
}

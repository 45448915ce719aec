//! # File Loading
//!
//! Reads domain definitions and saved input sets from JSON files. Both are
//! validated before they are returned, so a caller never holds a config with
//! an incomplete lookup table or an input set that does not fit its domain.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tally_core::file_io::{load_domain_config, load_inputs};
//! use tally_core::engine::compute;
//! use std::path::Path;
//!
//! let config = load_domain_config(Path::new("retaining-wall.json"))?;
//! let inputs = load_inputs(Path::new("backyard.json"), &config)?;
//! let estimate = compute(&inputs, &config)?;
//! # Ok::<(), tally_core::errors::CalcError>(())
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::DomainConfig;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSet;

fn read(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Load and validate a domain definition.
///
/// # Returns
///
/// * `Err(CalcError::FileError)` - I/O error
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::InvalidConfig)` - The definition is inconsistent
pub fn load_domain_config(path: &Path) -> CalcResult<DomainConfig> {
    let contents = read(path)?;
    let config: DomainConfig = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;
    config.validate()?;
    tracing::info!(path = %path.display(), domain = %config.name, "Loaded domain config");
    Ok(config)
}

/// Load an input set and check it against the domain.
///
/// A file that leaves out `geometry_units` is read in the domain's geometry
/// units; a file that names different ones is rejected.
pub fn load_inputs(path: &Path, config: &DomainConfig) -> CalcResult<InputSet> {
    let contents = read(path)?;
    let invalid = |e: serde_json::Error| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    };
    let mut value: Value = serde_json::from_str(&contents).map_err(invalid)?;
    if let Value::Object(map) = &mut value {
        if !map.contains_key("geometry_units") {
            map.insert("geometry_units".to_string(), serde_json::to_value(config.geometry_units)?);
        }
    }
    let inputs: InputSet = serde_json::from_value(value).map_err(invalid)?;
    config.check_inputs(&inputs)?;
    tracing::info!(path = %path.display(), fields = inputs.fields.len(), "Loaded input set");
    Ok(inputs)
}

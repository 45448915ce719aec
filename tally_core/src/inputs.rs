//! # Input Sets
//!
//! An [`InputSet`] is the snapshot of everything a user has entered into one
//! estimator: the active [`UnitSystem`], the shape, and a map of named
//! fields holding measured, plain numeric, boolean or enumerated values.
//!
//! Each domain declares its fields with a [`FieldSpec`] schema. Sets are
//! created from that schema (every field at its default), mutated one field
//! at a time, and checked with [`InputSet::validate_against`].
//!
//! Measured fields carry their own [`UnitPair`], so switching unit systems
//! with [`convert_unit_system`] needs no outside information: every
//! measurement is re-expressed at the same physical magnitude.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "unit_system": "Imperial",
//!   "geometry": { "shape": "Rectangle", "length": 40.0, "width": 12.0 },
//!   "fields": {
//!     "depth": { "value": 3.0, "units": { "imperial": { "dimension": "Length", "unit": "Inches" },
//!                                          "metric": { "dimension": "Length", "unit": "Centimeters" } } },
//!     "region": "Midwest",
//!     "haul_away": true
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::geometry::{GeometrySpec, GeometryUnits};
use crate::units::{PhysicalUnit, UnitPair, UnitSystem};

// ============================================================================
// Schema
// ============================================================================

/// The declared kind and default of a field.
///
/// Measured defaults are given in the imperial display unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FieldKind {
    /// Physical measurement in a per-system display unit
    Measure { units: UnitPair, default: f64 },
    /// Dimensionless number (ppm, coats, percent)
    Number {
        default: f64,
        #[serde(default)]
        unit_label: Option<String>,
    },
    /// On/off switch
    Flag { default: bool },
    /// One of a closed set of options
    Choice { options: Vec<String>, default: String },
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Measure { .. } => "measure",
            FieldKind::Number { .. } => "number",
            FieldKind::Flag { .. } => "flag",
            FieldKind::Choice { .. } => "choice",
        }
    }
}

/// One declared input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn measure(key: &str, label: &str, units: UnitPair, default: f64) -> Self {
        FieldSpec {
            key: key.to_string(),
            label: label.to_string(),
            kind: FieldKind::Measure { units, default },
        }
    }

    pub fn number(key: &str, label: &str, unit_label: Option<&str>, default: f64) -> Self {
        FieldSpec {
            key: key.to_string(),
            label: label.to_string(),
            kind: FieldKind::Number {
                default,
                unit_label: unit_label.map(str::to_string),
            },
        }
    }

    pub fn flag(key: &str, label: &str, default: bool) -> Self {
        FieldSpec {
            key: key.to_string(),
            label: label.to_string(),
            kind: FieldKind::Flag { default },
        }
    }

    pub fn choice(key: &str, label: &str, options: &[&str], default: &str) -> Self {
        FieldSpec {
            key: key.to_string(),
            label: label.to_string(),
            kind: FieldKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
                default: default.to_string(),
            },
        }
    }

    /// Options of a choice field, empty for other kinds
    pub fn options(&self) -> &[String] {
        match &self.kind {
            FieldKind::Choice { options, .. } => options,
            _ => &[],
        }
    }

    /// The default value in the given unit system
    pub fn default_value(&self, system: UnitSystem) -> FieldValue {
        match &self.kind {
            FieldKind::Measure { units, default } => FieldValue::Measure(Measure {
                value: units.convert(*default, UnitSystem::Imperial, system),
                units: *units,
            }),
            FieldKind::Number { default, .. } => FieldValue::Number(*default),
            FieldKind::Flag { default } => FieldValue::Flag(*default),
            FieldKind::Choice { default, .. } => FieldValue::Choice(default.clone()),
        }
    }

    /// Check a value against this declaration
    pub fn check(&self, value: &FieldValue) -> CalcResult<()> {
        match (&self.kind, value) {
            (FieldKind::Measure { units, .. }, FieldValue::Measure(m)) => {
                if m.units != *units {
                    return Err(CalcError::invalid_input(
                        &self.key,
                        format!("{:?}", m.units),
                        "Measurement units do not match the field declaration",
                    ));
                }
                check_number(&self.key, m.value)
            }
            (FieldKind::Number { .. }, FieldValue::Number(v)) => check_number(&self.key, *v),
            (FieldKind::Flag { .. }, FieldValue::Flag(_)) => Ok(()),
            (FieldKind::Choice { options, .. }, FieldValue::Choice(c)) => {
                if options.iter().any(|o| o == c) {
                    Ok(())
                } else {
                    Err(CalcError::invalid_choice(&self.key, c, options))
                }
            }
            (kind, value) => Err(CalcError::type_mismatch(&self.key, kind.name(), value.kind_name())),
        }
    }
}

fn check_number(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"));
    }
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must not be negative"));
    }
    Ok(())
}

// ============================================================================
// Values
// ============================================================================

/// A number in the display unit of the set's current unit system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub units: UnitPair,
}

impl Measure {
    /// Value in the dimension's canonical unit
    pub fn canonical(&self, system: UnitSystem) -> f64 {
        self.units.for_system(system).to_canonical(self.value)
    }

    /// Value expressed in the imperial display unit
    pub fn imperial(&self, system: UnitSystem) -> f64 {
        self.units.convert(self.value, system, UnitSystem::Imperial)
    }
}

/// A single field value.
///
/// Serialized untagged: measurements as `{ "value", "units" }`, numbers,
/// booleans and strings as themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Measure(Measure),
    Number(f64),
    Flag(bool),
    Choice(String),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Measure(_) => "measure",
            FieldValue::Number(_) => "number",
            FieldValue::Flag(_) => "flag",
            FieldValue::Choice(_) => "choice",
        }
    }
}

/// A complete, well-typed snapshot of one estimator's inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSet {
    #[serde(default)]
    pub unit_system: UnitSystem,

    #[serde(default)]
    pub geometry: GeometrySpec,

    #[serde(default)]
    pub geometry_units: GeometryUnits,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl InputSet {
    /// An empty set with no declared fields
    pub fn new(unit_system: UnitSystem) -> Self {
        InputSet {
            unit_system,
            geometry: GeometrySpec::default(),
            geometry_units: GeometryUnits::default(),
            fields: BTreeMap::new(),
        }
    }

    /// A set with every schema field at its default
    pub fn from_schema(schema: &[FieldSpec], geometry_units: GeometryUnits, unit_system: UnitSystem) -> Self {
        let fields = schema
            .iter()
            .map(|spec| (spec.key.clone(), spec.default_value(unit_system)))
            .collect();
        InputSet {
            unit_system,
            geometry: GeometrySpec::default(),
            geometry_units,
            fields,
        }
    }

    /// Replace the shape (builder pattern)
    pub fn with_geometry(mut self, geometry: GeometrySpec) -> Self {
        self.geometry = geometry.clamped();
        self
    }

    /// Set a numeric field (builder pattern), with the same clamping and
    /// errors as [`InputSet::set_number`]
    pub fn with_number(mut self, key: &str, value: f64) -> CalcResult<Self> {
        self.set_number(key, value)?;
        Ok(self)
    }

    /// Set a choice field (builder pattern)
    pub fn with_choice(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), FieldValue::Choice(value.to_string()));
        self
    }

    /// Set a flag field (builder pattern)
    pub fn with_flag(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), FieldValue::Flag(value));
        self
    }

    fn get(&self, key: &str) -> CalcResult<&FieldValue> {
        self.fields.get(key).ok_or_else(|| CalcError::missing_field(key))
    }

    /// Numeric value in the current display unit
    pub fn number(&self, key: &str) -> CalcResult<f64> {
        match self.get(key)? {
            FieldValue::Measure(m) => Ok(m.value),
            FieldValue::Number(v) => Ok(*v),
            other => Err(CalcError::type_mismatch(key, "number", other.kind_name())),
        }
    }

    /// Numeric value in canonical units (dimensionless numbers pass through)
    pub fn canonical(&self, key: &str) -> CalcResult<f64> {
        match self.get(key)? {
            FieldValue::Measure(m) => Ok(m.canonical(self.unit_system)),
            FieldValue::Number(v) => Ok(*v),
            other => Err(CalcError::type_mismatch(key, "number", other.kind_name())),
        }
    }

    /// Numeric value in the imperial display unit, the unit rule thresholds use
    pub fn imperial(&self, key: &str) -> CalcResult<f64> {
        match self.get(key)? {
            FieldValue::Measure(m) => Ok(m.imperial(self.unit_system)),
            FieldValue::Number(v) => Ok(*v),
            other => Err(CalcError::type_mismatch(key, "number", other.kind_name())),
        }
    }

    pub fn flag(&self, key: &str) -> CalcResult<bool> {
        match self.get(key)? {
            FieldValue::Flag(b) => Ok(*b),
            other => Err(CalcError::type_mismatch(key, "flag", other.kind_name())),
        }
    }

    pub fn choice(&self, key: &str) -> CalcResult<&str> {
        match self.get(key)? {
            FieldValue::Choice(c) => Ok(c.as_str()),
            other => Err(CalcError::type_mismatch(key, "choice", other.kind_name())),
        }
    }

    /// Set a numeric field, keeping its kind and units.
    ///
    /// Negative values clamp to zero; non-finite values are rejected.
    pub fn set_number(&mut self, key: &str, value: f64) -> CalcResult<()> {
        if !value.is_finite() {
            return Err(CalcError::invalid_input(key, value.to_string(), "Value must be a finite number"));
        }
        let value = value.max(0.0);
        match self.fields.get_mut(key) {
            Some(FieldValue::Measure(m)) => m.value = value,
            Some(FieldValue::Number(v)) => *v = value,
            Some(other) => return Err(CalcError::type_mismatch(key, "number", other.kind_name())),
            None => {
                self.fields.insert(key.to_string(), FieldValue::Number(value));
            }
        }
        Ok(())
    }

    /// Check every declared field is present, well-typed and in range,
    /// and that no undeclared field is present.
    pub fn validate_against(&self, schema: &[FieldSpec], domain: &str) -> CalcResult<()> {
        for key in self.fields.keys() {
            if !schema.iter().any(|spec| &spec.key == key) {
                return Err(CalcError::unknown_field(domain, key));
            }
        }
        for spec in schema {
            let value = self.get(&spec.key)?;
            spec.check(value)?;
        }
        for dim in self.geometry.dimensions() {
            if !dim.is_finite() || dim < 0.0 {
                return Err(CalcError::invalid_input(
                    "geometry",
                    dim.to_string(),
                    "Dimensions must be finite and non-negative",
                ));
            }
        }
        if let Some(problem) = self.geometry_units.problem() {
            return Err(CalcError::invalid_input(
                "geometry_units",
                format!("{:?}", self.geometry_units),
                problem,
            ));
        }
        Ok(())
    }
}

/// Re-express every measured value, and the shape, in the target unit system.
///
/// Plain numbers, flags and choices are copied unchanged. Converting to the
/// current system returns an identical copy.
pub fn convert_unit_system(inputs: &InputSet, target: UnitSystem) -> InputSet {
    let from = inputs.unit_system;
    if from == target {
        return inputs.clone();
    }

    let fields = inputs
        .fields
        .iter()
        .map(|(key, value)| {
            let converted = match value {
                FieldValue::Measure(m) => FieldValue::Measure(Measure {
                    value: m.units.convert(m.value, from, target),
                    units: m.units,
                }),
                other => other.clone(),
            };
            (key.clone(), converted)
        })
        .collect();

    tracing::info!(from = %from, to = %target, fields = inputs.fields.len(), "Converted input set");

    InputSet {
        unit_system: target,
        geometry: inputs.geometry.converted(&inputs.geometry_units, from, target),
        geometry_units: inputs.geometry_units,
        fields,
    }
}

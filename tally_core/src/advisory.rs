//! # Advisories
//!
//! Threshold rules that attach warnings and recommendations to a result.
//!
//! Every rule is a pure predicate over the inputs and the quantities derived
//! so far. Rules are evaluated independently and every matching rule is
//! reported; nothing suppresses a later rule. The output is grouped by
//! category (data-quality before best-practice) and keeps the declared rule
//! order within a category.
//!
//! ## Thresholds
//!
//! Field thresholds are written in the field's imperial display unit
//! (inches for a depth declared as inches/centimeters) and compare against
//! the current value converted to that unit, so one rule serves both unit
//! systems. Derived operands use canonical units (ft², ft³, gallons) or the
//! domain's quantity unit.
//!
//! ## Empty Extents
//!
//! When the shape resolves to zero area or volume, only rules that mention
//! [`Predicate::EmptyExtent`] are evaluated.

use serde::{Deserialize, Serialize};

use crate::adjustment::Adjusted;
use crate::errors::CalcResult;
use crate::geometry::Extent;
use crate::inputs::{FieldKind, FieldSpec, InputSet};
use crate::quantity::BaseQuantity;

/// How serious an advisory is (ordered: Info < Warning < Critical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Grouping of advisories; declaration order is output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdvisoryCategory {
    /// Inputs that look wrong or out of range
    DataQuality,
    /// Domain recommendations
    BestPractice,
}

/// A value a rule can test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operand", content = "field")]
pub enum Operand {
    /// An input field, in its imperial display unit
    Field(String),
    /// Resolved area in ft²
    Area,
    /// Fill volume in ft³
    FillVolume,
    /// Treated water volume in gallons
    WaterVolume,
    /// Concentration increase
    ConcentrationDelta,
    /// Base quantity in the domain unit
    BaseQuantity,
    /// Adjusted quantity in the domain unit
    AdjustedQuantity,
    /// Total cost
    TotalCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }
}

/// Condition under which a rule fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when")]
pub enum Predicate {
    Compare { operand: Operand, op: Comparison, threshold: f64 },
    ChoiceIs { field: String, value: String },
    FlagSet { field: String },
    EmptyExtent,
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
    Not { predicate: Box<Predicate> },
}

impl Predicate {
    pub fn compare(operand: Operand, op: Comparison, threshold: f64) -> Self {
        Predicate::Compare { operand, op, threshold }
    }

    /// Shorthand for comparing an input field
    pub fn field(key: &str, op: Comparison, threshold: f64) -> Self {
        Predicate::compare(Operand::Field(key.to_string()), op, threshold)
    }

    pub fn choice_is(field: &str, value: &str) -> Self {
        Predicate::ChoiceIs {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn flag_set(field: &str) -> Self {
        Predicate::FlagSet {
            field: field.to_string(),
        }
    }

    pub fn mentions_empty_extent(&self) -> bool {
        match self {
            Predicate::EmptyExtent => true,
            Predicate::All { of } | Predicate::Any { of } => of.iter().any(Predicate::mentions_empty_extent),
            Predicate::Not { predicate } => predicate.mentions_empty_extent(),
            _ => false,
        }
    }

    fn holds(&self, facts: &Facts<'_>) -> CalcResult<bool> {
        Ok(match self {
            Predicate::Compare { operand, op, threshold } => {
                facts.operand(operand)?.is_some_and(|v| op.holds(v, *threshold))
            }
            Predicate::ChoiceIs { field, value } => facts.inputs.choice(field)? == value,
            Predicate::FlagSet { field } => facts.inputs.flag(field)?,
            Predicate::EmptyExtent => facts.extent.is_empty(),
            Predicate::All { of } => {
                for p in of {
                    if !p.holds(facts)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Any { of } => {
                for p in of {
                    if p.holds(facts)? {
                        return Ok(true);
                    }
                }
                false
            }
            Predicate::Not { predicate } => !predicate.holds(facts)?,
        })
    }

    /// Describe the first reference problem against a schema, if any
    pub fn reference_problem(&self, schema: &[FieldSpec]) -> Option<String> {
        let kind_of = |key: &str| schema.iter().find(|s| s.key == key).map(|s| &s.kind);
        match self {
            Predicate::Compare {
                operand: Operand::Field(key),
                ..
            } => match kind_of(key) {
                Some(FieldKind::Measure { .. } | FieldKind::Number { .. }) => None,
                Some(_) => Some(format!("comparison on non-numeric field '{key}'")),
                None => Some(format!("rule reads undeclared field '{key}'")),
            },
            Predicate::ChoiceIs { field, value } => match kind_of(field) {
                Some(FieldKind::Choice { options, .. }) if options.contains(value) => None,
                Some(FieldKind::Choice { .. }) => Some(format!("'{value}' is not an option of '{field}'")),
                Some(_) => Some(format!("choice test on non-choice field '{field}'")),
                None => Some(format!("rule reads undeclared field '{field}'")),
            },
            Predicate::FlagSet { field } => match kind_of(field) {
                Some(FieldKind::Flag { .. }) => None,
                Some(_) => Some(format!("flag test on non-flag field '{field}'")),
                None => Some(format!("rule reads undeclared field '{field}'")),
            },
            Predicate::All { of } | Predicate::Any { of } => of.iter().find_map(|p| p.reference_problem(schema)),
            Predicate::Not { predicate } => predicate.reference_problem(schema),
            Predicate::Compare { .. } | Predicate::EmptyExtent => None,
        }
    }
}

/// A rule: when the predicate holds, report the message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRule {
    pub id: String,
    pub category: AdvisoryCategory,
    pub severity: Severity,
    pub message: String,
    pub when: Predicate,
}

impl AdvisoryRule {
    pub fn new(id: &str, category: AdvisoryCategory, severity: Severity, message: &str, when: Predicate) -> Self {
        AdvisoryRule {
            id: id.to_string(),
            category,
            severity,
            message: message.to_string(),
            when,
        }
    }
}

/// A fired rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub severity: Severity,
    pub category: AdvisoryCategory,
    pub message: String,
    /// Id of the rule that produced this advisory
    pub rule_id: String,
}

/// Everything the rules may read
#[derive(Debug, Clone, Copy)]
pub struct Facts<'a> {
    pub inputs: &'a InputSet,
    pub extent: &'a Extent,
    /// Absent when no quantity was derived (no-action)
    pub base: Option<&'a BaseQuantity>,
    pub adjusted: Option<&'a Adjusted>,
}

impl Facts<'_> {
    fn operand(&self, operand: &Operand) -> CalcResult<Option<f64>> {
        Ok(match operand {
            Operand::Field(key) => Some(self.inputs.imperial(key)?),
            Operand::Area => self.extent.area().map(|a| a.0),
            Operand::FillVolume => self.base.and_then(|b| b.fill_volume).map(|v| v.0),
            Operand::WaterVolume => self.base.and_then(|b| b.water_volume).map(|v| v.0),
            Operand::ConcentrationDelta => self.base.and_then(|b| b.concentration_delta),
            Operand::BaseQuantity => self.base.map(|b| b.value),
            Operand::AdjustedQuantity => self.adjusted.map(|a| a.quantity),
            Operand::TotalCost => self.adjusted.and_then(|a| a.cost.as_ref()).map(|c| c.total),
        })
    }
}

/// Evaluate every rule and return the matches, grouped by category.
pub fn evaluate(rules: &[AdvisoryRule], facts: &Facts<'_>) -> CalcResult<Vec<Advisory>> {
    let empty = facts.extent.is_empty();
    let mut fired = Vec::new();
    for rule in rules {
        if empty && !rule.when.mentions_empty_extent() {
            continue;
        }
        if rule.when.holds(facts)? {
            tracing::debug!(rule = %rule.id, severity = %rule.severity, "Advisory fired");
            fired.push(Advisory {
                severity: rule.severity,
                category: rule.category,
                message: rule.message.clone(),
                rule_id: rule.id.clone(),
            });
        }
    }
    // stable: declared order survives within a category
    fired.sort_by_key(|a| a.category);
    Ok(fired)
}

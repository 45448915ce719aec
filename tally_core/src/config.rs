//! # Domain Configuration
//!
//! A [`DomainConfig`] is everything that makes one estimator differ from
//! another: its field schema, the units its shape is entered in, the quantity
//! model, the ordered adjustment chain, optional pricing, advisory rules and
//! display rules. The engine itself holds no domain knowledge.
//!
//! Configs are plain data and round-trip through JSON. [`DomainConfig::validate`]
//! is run on every config before it is used, so that a lookup table missing an
//! option or a rule naming an undeclared field is caught when the domain is
//! defined rather than when a user first picks that option.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::adjustment::{AdjustmentFactor, FactorTarget, PricingModel};
use crate::advisory::AdvisoryRule;
use crate::errors::{CalcError, CalcResult};
use crate::format::DisplayRules;
use crate::geometry::GeometryUnits;
use crate::inputs::{FieldKind, FieldSpec, InputSet};
use crate::quantity::QuantityModel;
use crate::units::{PhysicalUnit, UnitSystem};

/// Complete definition of one estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Registry key ("asphalt-paving")
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,

    pub fields: Vec<FieldSpec>,

    #[serde(default)]
    pub geometry_units: GeometryUnits,

    pub quantity: QuantityModel,

    /// Applied in this order
    #[serde(default)]
    pub adjustments: Vec<AdjustmentFactor>,

    #[serde(default)]
    pub pricing: Option<PricingModel>,

    #[serde(default)]
    pub advisories: Vec<AdvisoryRule>,

    #[serde(default)]
    pub display: DisplayRules,

    /// Shown instead of a quantity when a dose would be zero or negative
    #[serde(default = "default_no_action_message")]
    pub no_action_message: String,
}

fn default_no_action_message() -> String {
    "No treatment needed: the current level already meets the target.".to_string()
}

impl DomainConfig {
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let config: DomainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a field declaration
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// An input set with every field at its default
    pub fn default_inputs(&self, system: UnitSystem) -> InputSet {
        InputSet::from_schema(&self.fields, self.geometry_units, system)
    }

    /// Check an input set fits this domain: schema, values, and the shape
    /// entered in this domain's geometry units.
    pub fn check_inputs(&self, inputs: &InputSet) -> CalcResult<()> {
        inputs.validate_against(&self.fields, &self.name)?;
        if inputs.geometry_units != self.geometry_units {
            return Err(CalcError::invalid_input(
                "geometry_units",
                format!("{:?}", inputs.geometry_units),
                format!("domain '{}' uses different geometry units", self.name),
            ));
        }
        Ok(())
    }

    /// Check the configuration is complete and internally consistent.
    pub fn validate(&self) -> CalcResult<()> {
        let fail = |reason: String| Err(CalcError::invalid_config(&self.name, reason));

        if self.name.trim().is_empty() {
            return fail("domain name is empty".to_string());
        }

        // Field schema
        let mut keys = HashSet::new();
        for field in &self.fields {
            if !keys.insert(field.key.as_str()) {
                return fail(format!("field '{}' is declared twice", field.key));
            }
            match &field.kind {
                FieldKind::Measure { units, default } => {
                    if !units.is_consistent() {
                        return fail(format!("field '{}' pairs units of different dimensions", field.key));
                    }
                    if !default.is_finite() || *default < 0.0 {
                        return fail(format!("field '{}' has an invalid default", field.key));
                    }
                }
                FieldKind::Number { default, .. } => {
                    if !default.is_finite() || *default < 0.0 {
                        return fail(format!("field '{}' has an invalid default", field.key));
                    }
                }
                FieldKind::Choice { options, default } => {
                    if options.is_empty() {
                        return fail(format!("choice field '{}' has no options", field.key));
                    }
                    if !options.contains(default) {
                        return fail(format!("default '{default}' of '{}' is not an option", field.key));
                    }
                    let unique: HashSet<&String> = options.iter().collect();
                    if unique.len() != options.len() {
                        return fail(format!("choice field '{}' repeats an option", field.key));
                    }
                }
                FieldKind::Flag { .. } => {}
            }
        }

        if let Some(problem) = self.geometry_units.problem() {
            return fail(problem);
        }

        // Quantity model
        for key in self.quantity.field_refs() {
            match self.field(key).map(|f| &f.kind) {
                Some(FieldKind::Measure { .. } | FieldKind::Number { .. }) => {}
                Some(_) => return fail(format!("quantity model reads non-numeric field '{key}'")),
                None => return fail(format!("quantity model reads undeclared field '{key}'")),
            }
        }
        for rate in self.quantity.rates() {
            if let Some(problem) = rate.coverage_problem(&self.fields) {
                return fail(problem);
            }
            if rate.values().iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return fail("quantity rates must be positive".to_string());
            }
        }
        if let QuantityModel::Dose { reference_gallons, .. } = &self.quantity {
            if !reference_gallons.is_finite() || *reference_gallons <= 0.0 {
                return fail("dose reference volume must be positive".to_string());
            }
        }

        // Adjustment chain
        let mut factor_keys = HashSet::new();
        for factor in &self.adjustments {
            if !factor_keys.insert(factor.key.as_str()) {
                return fail(format!("factor '{}' is declared twice", factor.key));
            }
            if let Some(problem) = factor.definition_problem(&self.fields) {
                return fail(problem);
            }
            match (&factor.target, &self.pricing) {
                (FactorTarget::Cost, None) | (FactorTarget::Line(_), None) => {
                    return fail(format!("factor '{}' adjusts cost but the domain is not priced", factor.key));
                }
                (FactorTarget::Line(line), Some(pricing)) => match pricing.line_items.iter().find(|l| &l.key == line) {
                    None => return fail(format!("factor '{}' targets unknown line '{line}'", factor.key)),
                    // fees and credits are applied after every multiplier
                    Some(spec) if !spec.role.is_variable() => {
                        return fail(format!(
                            "factor '{}' targets line '{line}', which is a fee or credit",
                            factor.key
                        ));
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }

        // Pricing
        if let Some(pricing) = &self.pricing {
            if !pricing.labor_rate_divisor.is_finite() || pricing.labor_rate_divisor <= 0.0 {
                return fail("labor rate divisor must be positive".to_string());
            }
            let mut line_keys = HashSet::new();
            for line in &pricing.line_items {
                if !line_keys.insert(line.key.as_str()) {
                    return fail(format!("line '{}' is declared twice", line.key));
                }
                if let Some(problem) = line.rate.coverage_problem(&self.fields) {
                    return fail(problem);
                }
                if let Some(flag) = &line.when {
                    if !matches!(self.field(flag).map(|f| &f.kind), Some(FieldKind::Flag { .. })) {
                        return fail(format!("line '{}' is switched by non-flag field '{flag}'", line.key));
                    }
                }
            }
        }

        // Advisories
        let mut rule_ids = HashSet::new();
        for rule in &self.advisories {
            if !rule_ids.insert(rule.id.as_str()) {
                return fail(format!("advisory rule '{}' is declared twice", rule.id));
            }
            if let Some(problem) = rule.when.reference_problem(&self.fields) {
                return fail(format!("advisory rule '{}': {problem}", rule.id));
            }
        }

        // Display
        if let Some(pair) = &self.display.quantity_units {
            if !pair.is_consistent() || !pair.imperial.same_dimension(&self.quantity.unit()) {
                return fail("display units must match the quantity's dimension".to_string());
            }
        }
        for promotion in &self.display.promotions {
            if !promotion.from.same_dimension(&promotion.to) || promotion.to.factor() <= promotion.from.factor() {
                return fail(format!(
                    "promotion from {} to {} must go to a larger unit of the same dimension",
                    promotion.from.symbol(),
                    promotion.to.symbol()
                ));
            }
        }
        if let Some(packaging) = &self.display.packaging {
            if !packaging.size.is_finite() || packaging.size <= 0.0 {
                return fail("package size must be positive".to_string());
            }
        }

        Ok(())
    }
}

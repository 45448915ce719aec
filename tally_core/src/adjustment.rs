//! # Adjustment Chain
//!
//! Applies a domain's ordered factors to the base quantity and, when the
//! domain is priced, builds the cost breakdown.
//!
//! ## Order of Operations
//!
//! ```text
//! quantity' = ((base × q₁) × q₂) × … + additive quantity factors
//! lines     = material/labor/delivery priced from quantity' and area
//! lines    ×= c₁, then × c₂, …            (multiplicative cost factors)
//! lines    += fees, permits               (flat, never multiplied)
//! total     = Σ charges − credits         (credits last, total ≥ 0)
//! ```
//!
//! Factors are applied strictly in the order the domain declares them, each
//! one to the running value, so a region → season → material → size-discount
//! chain is never reassociated. Reordering a domain's factors is a change to
//! its results.
//!
//! ## Labor Rate Divisor
//!
//! Labor lines divide their rate by [`PricingModel::labor_rate_divisor`].
//! Some calculators scale the user's labor input down before pricing; the
//! meaning of that scalar is not settled, so it is kept as a named per-domain
//! constant and set to 1.0 wherever a domain has no such scaling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::geometry::Extent;
use crate::inputs::{FieldSpec, InputSet};
use crate::quantity::BaseQuantity;
use crate::tables::Rate;

// ============================================================================
// Factor Definitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    Multiplicative,
    Additive,
}

/// What a factor adjusts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "applies_to", content = "key")]
pub enum FactorTarget {
    /// The physical quantity (waste, compaction, overfill)
    Quantity,
    /// Every variable cost line (material, labor, delivery)
    Cost,
    /// A single cost line by key (complexity on labor only)
    Line(String),
}

/// Measure that selects a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierBasis {
    /// Canonical area in ft²
    Area,
    /// Base quantity in the domain unit
    BaseQuantity,
}

/// Value applied once the basis reaches `min`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    pub value: f64,
}

/// Where a factor's value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum FactorSource {
    Constant { value: f64 },
    Choice { field: String, table: BTreeMap<String, f64> },
    Flag { field: String, on: f64, off: f64 },
    /// Highest tier whose `min` the basis reaches; `below` under the first tier
    Tiered { basis: TierBasis, tiers: Vec<Tier>, below: f64 },
}

/// One named step of the chain.
///
/// ## JSON Example
///
/// ```json
/// { "key": "region", "label": "Regional pricing", "kind": "Multiplicative",
///   "target": { "applies_to": "Cost" },
///   "source": { "source": "Choice", "field": "region",
///               "table": { "Northeast": 1.25, "South": 0.9 } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFactor {
    pub key: String,
    pub label: String,
    pub kind: FactorKind,
    pub target: FactorTarget,
    pub source: FactorSource,
}

impl AdjustmentFactor {
    pub fn multiplier(key: &str, label: &str, target: FactorTarget, source: FactorSource) -> Self {
        AdjustmentFactor {
            key: key.to_string(),
            label: label.to_string(),
            kind: FactorKind::Multiplicative,
            target,
            source,
        }
    }

    pub fn additive(key: &str, label: &str, target: FactorTarget, source: FactorSource) -> Self {
        AdjustmentFactor {
            key: key.to_string(),
            label: label.to_string(),
            kind: FactorKind::Additive,
            target,
            source,
        }
    }

    fn value(&self, inputs: &InputSet, area: f64, base: f64) -> CalcResult<f64> {
        match &self.source {
            FactorSource::Constant { value } => Ok(*value),
            FactorSource::Choice { field, table } => {
                let key = inputs.choice(field)?;
                table
                    .get(key)
                    .copied()
                    .ok_or_else(|| CalcError::missing_table_entry(field, key))
            }
            FactorSource::Flag { field, on, off } => Ok(if inputs.flag(field)? { *on } else { *off }),
            FactorSource::Tiered { basis, tiers, below } => {
                let measure = match basis {
                    TierBasis::Area => area,
                    TierBasis::BaseQuantity => base,
                };
                Ok(tiers
                    .iter()
                    .filter(|t| measure >= t.min)
                    .last()
                    .map_or(*below, |t| t.value))
            }
        }
    }

    /// Every value the factor can take
    pub fn values(&self) -> Vec<f64> {
        match &self.source {
            FactorSource::Constant { value } => vec![*value],
            FactorSource::Choice { table, .. } => table.values().copied().collect(),
            FactorSource::Flag { on, off, .. } => vec![*on, *off],
            FactorSource::Tiered { tiers, below, .. } => {
                tiers.iter().map(|t| t.value).chain(std::iter::once(*below)).collect()
            }
        }
    }

    /// Describe the first definition problem against a schema, if any
    pub fn definition_problem(&self, schema: &[FieldSpec]) -> Option<String> {
        if self.kind == FactorKind::Additive && matches!(self.target, FactorTarget::Line(_)) {
            return Some(format!("additive factor '{}' cannot target a single line", self.key));
        }
        let values = self.values();
        match self.kind {
            FactorKind::Multiplicative if values.iter().any(|v| !v.is_finite() || *v <= 0.0) => {
                return Some(format!("multiplier '{}' must be positive", self.key));
            }
            FactorKind::Additive if values.iter().any(|v| !v.is_finite()) => {
                return Some(format!("additive factor '{}' must be finite", self.key));
            }
            _ => {}
        }
        if let FactorSource::Tiered { tiers, .. } = &self.source {
            if tiers.iter().any(|t| !t.min.is_finite()) {
                return Some(format!("tiers of factor '{}' need finite bounds", self.key));
            }
        }
        match &self.source {
            FactorSource::Constant { .. } => None,
            FactorSource::Choice { field, table } => Rate::ByChoice {
                field: field.clone(),
                table: table.clone(),
            }
            .coverage_problem(schema),
            FactorSource::Flag { field, .. } => match schema.iter().find(|s| &s.key == field) {
                Some(spec) if spec.kind.name() == "flag" => None,
                Some(_) => Some(format!("factor '{}' reads non-flag field '{field}'", self.key)),
                None => Some(format!("factor '{}' reads undeclared field '{field}'", self.key)),
            },
            FactorSource::Tiered { tiers, .. } => {
                if tiers.windows(2).any(|w| w[1].min < w[0].min) {
                    Some(format!("tiers of factor '{}' must be sorted by min", self.key))
                } else {
                    None
                }
            }
        }
    }
}

// ============================================================================
// Pricing Definitions
// ============================================================================

/// What a cost line is priced per
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceBasis {
    /// Per unit of adjusted quantity
    PerQuantity,
    /// Per canonical ft² of area
    PerArea,
    /// Once per job
    Flat,
}

/// Role of a cost line in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineRole {
    Material,
    Labor,
    Delivery,
    /// Flat fee or permit, added after multipliers
    Fee,
    /// Savings subtracted last (recycling credit, rebate)
    Credit,
}

impl LineRole {
    /// Whether multiplicative cost factors scale this line
    pub fn is_variable(self) -> bool {
        matches!(self, LineRole::Material | LineRole::Labor | LineRole::Delivery)
    }
}

/// A priced line of the breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemSpec {
    pub key: String,
    pub label: String,
    pub role: LineRole,
    pub basis: PriceBasis,
    pub rate: Rate,
    /// Flag field that switches the line on; always on when absent
    #[serde(default)]
    pub when: Option<String>,
}

impl LineItemSpec {
    pub fn new(key: &str, label: &str, role: LineRole, basis: PriceBasis, rate: Rate) -> Self {
        LineItemSpec {
            key: key.to_string(),
            label: label.to_string(),
            role,
            basis,
            rate,
            when: None,
        }
    }

    /// Only include the line when a flag is set (builder pattern)
    pub fn when(mut self, flag_field: &str) -> Self {
        self.when = Some(flag_field.to_string());
        self
    }
}

/// How a domain prices its adjusted quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingModel {
    pub line_items: Vec<LineItemSpec>,

    /// Divisor applied to every labor line's rate before pricing.
    ///
    /// Kept as a named constant because the real-world unit of the scaled
    /// labor input is not defined by the calculators that use it.
    #[serde(default = "default_divisor")]
    pub labor_rate_divisor: f64,

    /// 0 for whole currency units, 2 for cents
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,
}

fn default_divisor() -> f64 {
    1.0
}

fn default_currency_decimals() -> u32 {
    2
}

impl PricingModel {
    pub fn new(line_items: Vec<LineItemSpec>) -> Self {
        PricingModel {
            line_items,
            labor_rate_divisor: 1.0,
            currency_decimals: 2,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// A factor as actually applied, in application order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFactor {
    pub key: String,
    pub label: String,
    pub kind: FactorKind,
    pub target: FactorTarget,
    pub value: f64,
}

/// One line of a cost breakdown. Credits carry negative amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub key: String,
    pub label: String,
    pub role: LineRole,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    pub total: f64,
}

impl CostBreakdown {
    pub fn line(&self, key: &str) -> Option<&CostLine> {
        self.lines.iter().find(|l| l.key == key)
    }
}

/// Output of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjusted {
    /// Base quantity before any factor
    pub base: f64,
    /// Quantity after quantity factors
    pub quantity: f64,
    pub factors: Vec<AppliedFactor>,
    pub cost: Option<CostBreakdown>,
}

// ============================================================================
// Chain
// ============================================================================

/// Run the adjustment chain.
///
/// An empty extent short-circuits to zero quantity and zero cost, flat fees
/// included.
pub fn apply(
    factors: &[AdjustmentFactor],
    pricing: Option<&PricingModel>,
    base: &BaseQuantity,
    extent: &Extent,
    inputs: &InputSet,
) -> CalcResult<Adjusted> {
    let empty = extent.is_empty();
    let area = extent.area().map_or(0.0, |a| a.0);
    let mut applied = Vec::new();

    // Quantity: multipliers in declared order, then additive terms
    let mut quantity = if empty { 0.0 } else { base.value };
    for kind in [FactorKind::Multiplicative, FactorKind::Additive] {
        for factor in factors
            .iter()
            .filter(|f| f.kind == kind && f.target == FactorTarget::Quantity)
        {
            let value = factor.value(inputs, area, base.value)?;
            quantity = match kind {
                FactorKind::Multiplicative => quantity * value,
                FactorKind::Additive if empty => quantity,
                FactorKind::Additive => (quantity + value).max(0.0),
            };
            trace_factor(factor, value);
            applied.push(record(factor, value));
        }
    }

    let cost = match pricing {
        Some(pricing) => Some(price(factors, pricing, quantity, area, empty, base.value, inputs, &mut applied)?),
        None => None,
    };

    tracing::debug!(
        base = base.value,
        adjusted = quantity,
        total = cost.as_ref().map(|c| c.total),
        "Applied adjustment chain"
    );

    Ok(Adjusted {
        base: base.value,
        quantity,
        factors: applied,
        cost,
    })
}

#[allow(clippy::too_many_arguments)]
fn price(
    factors: &[AdjustmentFactor],
    pricing: &PricingModel,
    quantity: f64,
    area: f64,
    empty: bool,
    base: f64,
    inputs: &InputSet,
    applied: &mut Vec<AppliedFactor>,
) -> CalcResult<CostBreakdown> {
    let mut lines = Vec::new();
    for spec in &pricing.line_items {
        if let Some(flag) = &spec.when {
            if !inputs.flag(flag)? {
                continue;
            }
        }
        let mut rate = spec.rate.resolve(inputs)?;
        if spec.role == LineRole::Labor && pricing.labor_rate_divisor > 0.0 {
            rate /= pricing.labor_rate_divisor;
        }
        let amount = if empty {
            0.0
        } else {
            match spec.basis {
                PriceBasis::PerQuantity => quantity * rate,
                PriceBasis::PerArea => area * rate,
                PriceBasis::Flat => rate,
            }
        };
        lines.push(CostLine {
            key: spec.key.clone(),
            label: spec.label.clone(),
            role: spec.role,
            amount: amount.max(0.0),
        });
    }

    // Multiplicative cost factors, each applied to the running line amounts
    for factor in factors
        .iter()
        .filter(|f| f.kind == FactorKind::Multiplicative && f.target != FactorTarget::Quantity)
    {
        let value = factor.value(inputs, area, base)?;
        for line in lines.iter_mut() {
            let in_scope = match &factor.target {
                FactorTarget::Line(key) => &line.key == key,
                _ => line.role.is_variable(),
            };
            if in_scope {
                line.amount *= value;
            }
        }
        trace_factor(factor, value);
        applied.push(record(factor, value));
    }

    // Additive cost factors: positive values are fees, negative are credits
    for factor in factors
        .iter()
        .filter(|f| f.kind == FactorKind::Additive && f.target == FactorTarget::Cost)
    {
        let value = factor.value(inputs, area, base)?;
        trace_factor(factor, value);
        applied.push(record(factor, value));
        if empty || value == 0.0 {
            continue;
        }
        lines.push(CostLine {
            key: factor.key.clone(),
            label: factor.label.clone(),
            role: if value > 0.0 { LineRole::Fee } else { LineRole::Credit },
            amount: value.abs(),
        });
    }

    // Charges first, then credits clamped against what remains
    let mut total: f64 = lines
        .iter()
        .filter(|l| l.role != LineRole::Credit)
        .map(|l| l.amount)
        .sum();
    let (mut charges, credits): (Vec<CostLine>, Vec<CostLine>) =
        lines.into_iter().partition(|l| l.role != LineRole::Credit);
    for mut credit in credits {
        let taken = credit.amount.min(total).max(0.0);
        total -= taken;
        credit.amount = -taken;
        charges.push(credit);
    }

    Ok(CostBreakdown {
        lines: charges,
        total: total.max(0.0),
    })
}

fn record(factor: &AdjustmentFactor, value: f64) -> AppliedFactor {
    AppliedFactor {
        key: factor.key.clone(),
        label: factor.label.clone(),
        kind: factor.kind,
        target: factor.target.clone(),
        value,
    }
}

fn trace_factor(factor: &AdjustmentFactor, value: f64) {
    tracing::trace!(key = %factor.key, kind = ?factor.kind, value, "Applied factor");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryUnits;
    use crate::units::{MassUnit, SqFt, Unit, UnitSystem};
    use proptest::prelude::*;

    fn schema() -> Vec<FieldSpec> {
        vec![
            FieldSpec::choice("region", "Region", &["Low", "High"], "Low"),
            FieldSpec::flag("recycle", "Recycle old surface", false),
            FieldSpec::number("labor_rate", "Labor rate", Some("$/ft²"), 20.0),
        ]
    }

    fn inputs() -> InputSet {
        InputSet::from_schema(&schema(), GeometryUnits::default(), UnitSystem::Imperial)
    }

    fn base(value: f64) -> BaseQuantity {
        BaseQuantity {
            value,
            unit: Unit::Mass(MassUnit::ShortTons),
            fill_volume: None,
            weight: None,
            water_volume: None,
            concentration_delta: None,
        }
    }

    fn region_table() -> FactorSource {
        FactorSource::Choice {
            field: "region".to_string(),
            table: [("Low".to_string(), 1.0), ("High".to_string(), 1.5)].into_iter().collect(),
        }
    }

    fn pricing() -> PricingModel {
        PricingModel::new(vec![
            LineItemSpec::new("material", "Material", LineRole::Material, PriceBasis::PerQuantity, Rate::fixed(100.0)),
            LineItemSpec::new("permit", "Permit", LineRole::Fee, PriceBasis::Flat, Rate::fixed(150.0)),
            LineItemSpec::new("recycling", "Recycling credit", LineRole::Credit, PriceBasis::PerArea, Rate::fixed(0.5))
                .when("recycle"),
        ])
    }

    #[test]
    fn test_quantity_multipliers_then_additive() {
        let factors = vec![
            AdjustmentFactor::additive("overfill", "Overfill", FactorTarget::Quantity, FactorSource::Constant { value: 1.0 }),
            AdjustmentFactor::multiplier("waste", "Waste", FactorTarget::Quantity, FactorSource::Constant { value: 1.1 }),
        ];
        let adjusted = apply(&factors, None, &base(10.0), &Extent::Area(SqFt(100.0)), &inputs()).unwrap();
        // 10 × 1.1 + 1, even though the additive is declared first
        assert!((adjusted.quantity - 12.0).abs() < 1e-9);
        assert_eq!(adjusted.factors[0].key, "waste");
        assert_eq!(adjusted.factors[1].key, "overfill");
        assert!(adjusted.cost.is_none());
    }

    #[test]
    fn test_fees_not_multiplied() {
        let factors = vec![AdjustmentFactor::multiplier("region", "Region", FactorTarget::Cost, region_table())];
        let inputs = inputs().with_choice("region", "High");
        let adjusted = apply(&factors, Some(&pricing()), &base(10.0), &Extent::Area(SqFt(100.0)), &inputs).unwrap();
        let cost = adjusted.cost.unwrap();
        assert!((cost.line("material").unwrap().amount - 1500.0).abs() < 1e-9);
        assert!((cost.line("permit").unwrap().amount - 150.0).abs() < 1e-9);
        assert!((cost.total - 1650.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_target_and_labor_divisor() {
        let mut pricing = PricingModel::new(vec![
            LineItemSpec::new("material", "Material", LineRole::Material, PriceBasis::PerQuantity, Rate::fixed(100.0)),
            LineItemSpec::new(
                "labor",
                "Labor",
                LineRole::Labor,
                PriceBasis::PerArea,
                Rate::by_choice("region", &[("Low", 20.0), ("High", 30.0)]),
            ),
        ]);
        pricing.labor_rate_divisor = 10.0;
        let factors = vec![AdjustmentFactor::multiplier(
            "complexity",
            "Complexity",
            FactorTarget::Line("labor".to_string()),
            FactorSource::Constant { value: 1.2 },
        )];
        let adjusted = apply(&factors, Some(&pricing), &base(10.0), &Extent::Area(SqFt(100.0)), &inputs()).unwrap();
        let cost = adjusted.cost.unwrap();
        // 100 ft² × (20 / 10) × 1.2
        assert!((cost.line("labor").unwrap().amount - 240.0).abs() < 1e-9);
        assert!((cost.line("material").unwrap().amount - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_credit_subtracted_last_and_clamped() {
        let inputs = inputs().with_flag("recycle", true);
        let factors = vec![AdjustmentFactor::additive(
            "rebate",
            "Rebate",
            FactorTarget::Cost,
            FactorSource::Constant { value: -5000.0 },
        )];
        let adjusted = apply(&factors, Some(&pricing()), &base(10.0), &Extent::Area(SqFt(100.0)), &inputs).unwrap();
        let cost = adjusted.cost.unwrap();
        // 1000 material + 150 permit - 50 recycling, then rebate takes the rest
        assert_eq!(cost.total, 0.0);
        assert!((cost.line("recycling").unwrap().amount + 50.0).abs() < 1e-9);
        assert!((cost.line("rebate").unwrap().amount + 1100.0).abs() < 1e-9);
        let sum: f64 = cost.lines.iter().map(|l| l.amount).sum();
        assert!((sum - cost.total).abs() < 1e-9);
    }

    #[test]
    fn test_order_matters_for_tiers() {
        let tiers = FactorSource::Tiered {
            basis: TierBasis::Area,
            tiers: vec![Tier { min: 1000.0, value: 0.95 }, Tier { min: 5000.0, value: 0.9 }],
            below: 1.0,
        };
        let factor = AdjustmentFactor::multiplier("size", "Size discount", FactorTarget::Cost, tiers);
        let small = factor.value(&inputs(), 999.0, 0.0).unwrap();
        let medium = factor.value(&inputs(), 1000.0, 0.0).unwrap();
        let large = factor.value(&inputs(), 9000.0, 0.0).unwrap();
        assert_eq!((small, medium, large), (1.0, 0.95, 0.9));
    }

    #[test]
    fn test_empty_extent_is_zero_cost() {
        let factors = vec![AdjustmentFactor::additive(
            "permit_fee",
            "Permit",
            FactorTarget::Cost,
            FactorSource::Constant { value: 200.0 },
        )];
        let adjusted = apply(&factors, Some(&pricing()), &base(0.0), &Extent::Area(SqFt(0.0)), &inputs()).unwrap();
        assert_eq!(adjusted.quantity, 0.0);
        assert_eq!(adjusted.cost.unwrap().total, 0.0);
    }

    #[test]
    fn test_definition_problems() {
        let bad = AdjustmentFactor::additive(
            "x",
            "X",
            FactorTarget::Line("labor".to_string()),
            FactorSource::Constant { value: 1.0 },
        );
        assert!(bad.definition_problem(&schema()).is_some());

        let flag_on_choice = AdjustmentFactor::multiplier(
            "y",
            "Y",
            FactorTarget::Cost,
            FactorSource::Flag { field: "region".to_string(), on: 1.1, off: 1.0 },
        );
        assert!(flag_on_choice.definition_problem(&schema()).unwrap().contains("non-flag"));

        let good = AdjustmentFactor::multiplier("region", "Region", FactorTarget::Cost, region_table());
        assert!(good.definition_problem(&schema()).is_none());
    }

    #[test]
    fn test_multiplier_values_must_be_positive() {
        let negative = AdjustmentFactor::multiplier("credit", "Credit", FactorTarget::Cost, FactorSource::Constant { value: -1.0 });
        assert!(negative.definition_problem(&schema()).unwrap().contains("must be positive"));

        let zero_when_off = AdjustmentFactor::multiplier(
            "recycle",
            "Recycle",
            FactorTarget::Quantity,
            FactorSource::Flag { field: "recycle".to_string(), on: 0.9, off: 0.0 },
        );
        assert!(zero_when_off.definition_problem(&schema()).is_some());

        let nan_tier = AdjustmentFactor::multiplier(
            "size",
            "Size",
            FactorTarget::Cost,
            FactorSource::Tiered { basis: TierBasis::Area, tiers: vec![Tier { min: 100.0, value: f64::NAN }], below: 1.0 },
        );
        assert!(nan_tier.definition_problem(&schema()).is_some());

        let infinite_fee = AdjustmentFactor::additive("fee", "Fee", FactorTarget::Cost, FactorSource::Constant { value: f64::INFINITY });
        assert!(infinite_fee.definition_problem(&schema()).unwrap().contains("finite"));

        let rebate = AdjustmentFactor::additive("rebate", "Rebate", FactorTarget::Cost, FactorSource::Constant { value: -50.0 });
        assert!(rebate.definition_problem(&schema()).is_none());
    }

    proptest! {
        #[test]
        fn prop_breakdown_sums_to_total(q in 0.0f64..1e4, area in 0.0f64..1e5, rebate in -1e5f64..0.0, recycle in any::<bool>()) {
            let inputs = inputs().with_flag("recycle", recycle);
            let factors = vec![
                AdjustmentFactor::multiplier("region", "Region", FactorTarget::Cost, region_table()),
                AdjustmentFactor::additive("rebate", "Rebate", FactorTarget::Cost, FactorSource::Constant { value: rebate }),
            ];
            let adjusted = apply(&factors, Some(&pricing()), &base(q), &Extent::Area(SqFt(area)), &inputs).unwrap();
            let cost = adjusted.cost.unwrap();
            let sum: f64 = cost.lines.iter().map(|l| l.amount).sum();
            prop_assert!(cost.total >= 0.0);
            prop_assert!((sum - cost.total).abs() <= 1e-6 * cost.total.max(1.0));
        }

        #[test]
        fn prop_positive_multiplier_monotonic(q in 0.0f64..1e4, m in 1.0f64..3.0, bump in 0.0f64..2.0) {
            let run = |mult: f64| {
                let factors = vec![
                    AdjustmentFactor::multiplier("waste", "Waste", FactorTarget::Quantity, FactorSource::Constant { value: mult }),
                    AdjustmentFactor::multiplier("season", "Season", FactorTarget::Cost, FactorSource::Constant { value: mult }),
                ];
                apply(&factors, Some(&pricing()), &base(q), &Extent::Area(SqFt(100.0)), &inputs()).unwrap()
            };
            let low = run(m);
            let high = run(m + bump);
            prop_assert!(high.quantity >= low.quantity);
            prop_assert!(high.cost.unwrap().total >= low.cost.unwrap().total);
        }
    }
}

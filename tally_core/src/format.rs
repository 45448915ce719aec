//! # Result Formatting
//!
//! Rounds values to display precision, picks the display unit for the active
//! unit system, promotes large quantities to a secondary human-scale unit,
//! and assembles the immutable [`ResultRecord`].
//!
//! ## Precision
//!
//! | Value                      | Decimals                  |
//! |----------------------------|---------------------------|
//! | Quantity below 10          | 2                         |
//! | Quantity of 10 or more     | 1                         |
//! | Area / volume              | 2                         |
//! | Currency                   | per domain (0 or 2)       |
//!
//! Cost lines are rounded so that they add up exactly to the rounded total
//! (largest-remainder apportionment), each line moving by at most one
//! display step.
//!
//! ## Secondary Units
//!
//! ```text
//! fl oz → gal  past 128     mL → L   past 1000
//! oz    → lb   past 16      g  → kg  past 1000
//! lb    → tons past 2000    kg → t   past 1000
//! ```

use serde::{Deserialize, Serialize};

use crate::adjustment::{Adjusted, AppliedFactor, CostLine};
use crate::advisory::Advisory;
use crate::geometry::{Extent, GeometryUnits};
use crate::quantity::BaseQuantity;
use crate::units::{AreaUnit, LengthUnit, MassUnit, PhysicalUnit, Unit, UnitPair, UnitSystem, VolumeUnit};

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Decimals for a physical quantity of this magnitude
pub fn quantity_decimals(value: f64) -> u32 {
    if value.abs() < 10.0 {
        2
    } else {
        1
    }
}

/// The metric display unit paired with an imperial quantity unit
pub fn metric_counterpart(unit: Unit) -> Unit {
    match unit {
        Unit::Mass(MassUnit::Ounces) => Unit::Mass(MassUnit::Grams),
        Unit::Mass(MassUnit::Pounds) => Unit::Mass(MassUnit::Kilograms),
        Unit::Mass(MassUnit::ShortTons) => Unit::Mass(MassUnit::MetricTonnes),
        Unit::Volume(VolumeUnit::FluidOunces) => Unit::Volume(VolumeUnit::Milliliters),
        Unit::Volume(VolumeUnit::Quarts | VolumeUnit::Gallons) => Unit::Volume(VolumeUnit::Liters),
        Unit::Volume(VolumeUnit::CubicFeet | VolumeUnit::CubicYards) => Unit::Volume(VolumeUnit::CubicMeters),
        Unit::Area(AreaUnit::SquareFeet | AreaUnit::SquareYards | AreaUnit::Acres) => {
            Unit::Area(AreaUnit::SquareMeters)
        }
        Unit::Length(LengthUnit::Inches) => Unit::Length(LengthUnit::Centimeters),
        Unit::Length(LengthUnit::Feet | LengthUnit::Yards) => Unit::Length(LengthUnit::Meters),
        metric => metric,
    }
}

/// Promote to a larger unit once a value passes a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub from: Unit,
    pub to: Unit,
    /// Strictly-greater threshold, in `from` units
    pub threshold: f64,
}

impl Promotion {
    pub fn new(from: Unit, to: Unit, threshold: f64) -> Self {
        Promotion { from, to, threshold }
    }

    /// Standard promotions for liquid, weight and bulk quantities
    pub fn defaults() -> Vec<Promotion> {
        vec![
            Promotion::new(Unit::Volume(VolumeUnit::FluidOunces), Unit::Volume(VolumeUnit::Gallons), 128.0),
            Promotion::new(Unit::Volume(VolumeUnit::Milliliters), Unit::Volume(VolumeUnit::Liters), 1000.0),
            Promotion::new(Unit::Mass(MassUnit::Ounces), Unit::Mass(MassUnit::Pounds), 16.0),
            Promotion::new(Unit::Mass(MassUnit::Grams), Unit::Mass(MassUnit::Kilograms), 1000.0),
            Promotion::new(Unit::Mass(MassUnit::Pounds), Unit::Mass(MassUnit::ShortTons), 2000.0),
            Promotion::new(Unit::Mass(MassUnit::Kilograms), Unit::Mass(MassUnit::MetricTonnes), 1000.0),
        ]
    }
}

/// Buy-in-whole-packages rounding (bags, pails)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    /// Package size in the domain's quantity unit
    pub size: f64,
    /// Plural name ("bags")
    pub label: String,
}

/// Per-domain display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRules {
    /// Display units for the quantity; defaults to the model unit and its
    /// metric counterpart
    #[serde(default)]
    pub quantity_units: Option<UnitPair>,

    #[serde(default = "Promotion::defaults")]
    pub promotions: Vec<Promotion>,

    #[serde(default)]
    pub packaging: Option<Packaging>,
}

impl Default for DisplayRules {
    fn default() -> Self {
        DisplayRules {
            quantity_units: None,
            promotions: Promotion::defaults(),
            packaging: None,
        }
    }
}

impl DisplayRules {
    fn quantity_unit(&self, model_unit: Unit, system: UnitSystem) -> Unit {
        match (self.quantity_units, system) {
            (Some(pair), system) => pair.for_system(system),
            (None, UnitSystem::Imperial) => model_unit,
            (None, UnitSystem::Metric) => metric_counterpart(model_unit),
        }
    }
}

/// A rounded value with its unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
    pub symbol: String,
}

impl Measurement {
    /// Convert a value from `from` into `to` and round for display
    pub fn convert(value: f64, from: Unit, to: Unit) -> Self {
        let converted = to.from_canonical(from.to_canonical(value));
        Measurement::rounded(converted, to, quantity_decimals(converted))
    }

    pub fn rounded(value: f64, unit: Unit, decimals: u32) -> Self {
        Measurement {
            value: round_to(value, decimals),
            unit,
            symbol: unit.symbol().to_string(),
        }
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.symbol)
    }
}

/// A labelled intermediate quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub label: String,
    pub measurement: Measurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageCount {
    pub count: u64,
    pub size: f64,
    pub label: String,
}

/// Rounded cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub lines: Vec<CostLine>,
    pub total: f64,
    pub decimals: u32,
}

/// The immutable output of one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub domain: String,
    pub unit_system: UnitSystem,
    /// Area or volume the estimate covers
    pub extent: Measurement,
    /// Quantity before adjustment factors
    pub base_quantity: Measurement,
    /// Adjusted quantity, the headline number
    pub quantity: Measurement,
    /// Larger-unit restatement once the quantity passes a promotion threshold
    pub secondary: Option<Measurement>,
    pub packages: Option<PackageCount>,
    pub details: Vec<Detail>,
    pub factors: Vec<AppliedFactor>,
    pub cost: Option<CostSummary>,
    pub advisories: Vec<Advisory>,
}

/// Pick the secondary display for a quantity, if a promotion applies
pub fn secondary_unit(value: f64, unit: Unit, promotions: &[Promotion]) -> Option<Measurement> {
    promotions
        .iter()
        .find(|p| p.from == unit && value > p.threshold)
        .map(|p| Measurement::convert(value, p.from, p.to))
}

/// Round cost lines so they sum exactly to the rounded total.
///
/// Each line is rounded half-away-from-zero, then the residual steps are
/// handed to the lines whose rounding moved them furthest in the other
/// direction, one step per line at most. Lines that already add up to the
/// total leave a residual no larger than the line count, so they always
/// balance.
pub fn apportion(amounts: &[f64], total: f64, decimals: u32) -> (Vec<f64>, f64) {
    let scale = 10f64.powi(decimals as i32);
    let target = (total * scale).round() as i64;
    let mut steps: Vec<i64> = amounts.iter().map(|a| (a * scale).round() as i64).collect();
    let residual = target - steps.iter().sum::<i64>();

    // error = rounded - exact; push up the most under-rounded first, and vice versa
    let errors: Vec<f64> = steps
        .iter()
        .zip(amounts)
        .map(|(s, a)| *s as f64 - a * scale)
        .collect();
    let mut order: Vec<usize> = (0..amounts.len()).collect();
    if residual > 0 {
        order.sort_by(|&a, &b| errors[a].total_cmp(&errors[b]));
    } else {
        order.sort_by(|&a, &b| errors[b].total_cmp(&errors[a]));
    }
    let step = residual.signum();
    for &i in order.iter().take(residual.unsigned_abs() as usize) {
        steps[i] += step;
    }

    let lines = steps.iter().map(|s| *s as f64 / scale).collect();
    (lines, target as f64 / scale)
}

/// Inputs to record assembly
pub struct FormatContext<'a> {
    pub domain: &'a str,
    pub unit_system: UnitSystem,
    pub extent: &'a Extent,
    pub geometry_units: &'a GeometryUnits,
    pub base: &'a BaseQuantity,
    pub adjusted: Adjusted,
    pub advisories: Vec<Advisory>,
    pub rules: &'a DisplayRules,
    pub currency_decimals: u32,
}

/// Assemble the final record.
pub fn assemble(ctx: FormatContext<'_>) -> ResultRecord {
    let system = ctx.unit_system;
    let model_unit = ctx.base.unit;
    let display_unit = ctx.rules.quantity_unit(model_unit, system);

    let extent = match ctx.extent {
        Extent::Area(a) => {
            let unit = ctx.geometry_units.area.for_system(system);
            Measurement::rounded(unit.from_canonical(a.0), unit, 2)
        }
        Extent::Volume(v) => {
            let unit = ctx.geometry_units.volume.for_system(system);
            Measurement::convert(v.0, Unit::Volume(VolumeUnit::CubicFeet), unit)
        }
    };

    let base_quantity = Measurement::convert(ctx.base.value, model_unit, display_unit);
    let quantity = Measurement::convert(ctx.adjusted.quantity, model_unit, display_unit);
    let display_value = display_unit.from_canonical(model_unit.to_canonical(ctx.adjusted.quantity));
    let secondary = secondary_unit(display_value, display_unit, &ctx.rules.promotions);

    let packages = ctx.rules.packaging.as_ref().filter(|p| p.size > 0.0).map(|p| PackageCount {
        // tolerance keeps 4.0000000001 bags at 4
        count: (ctx.adjusted.quantity / p.size - 1e-9).ceil().max(0.0) as u64,
        size: p.size,
        label: p.label.clone(),
    });

    let mut details = Vec::new();
    if let Some(v) = ctx.base.fill_volume {
        let unit = ctx.geometry_units.volume.for_system(system);
        details.push(Detail {
            label: "Fill volume".to_string(),
            measurement: Measurement::convert(v.0, Unit::Volume(VolumeUnit::CubicFeet), unit),
        });
    }
    if let Some(w) = ctx.base.weight {
        let unit = match system {
            UnitSystem::Imperial => Unit::Mass(MassUnit::Pounds),
            UnitSystem::Metric => Unit::Mass(MassUnit::Kilograms),
        };
        details.push(Detail {
            label: "Weight".to_string(),
            measurement: Measurement::convert(w.0, Unit::Mass(MassUnit::Pounds), unit),
        });
    }
    if let Some(g) = ctx.base.water_volume {
        let unit = metric_aware(Unit::Volume(VolumeUnit::Gallons), system);
        details.push(Detail {
            label: "Water volume".to_string(),
            measurement: Measurement::convert(g.0, Unit::Volume(VolumeUnit::Gallons), unit),
        });
    }

    let cost = ctx.adjusted.cost.as_ref().map(|c| {
        let amounts: Vec<f64> = c.lines.iter().map(|l| l.amount).collect();
        let (rounded, total) = apportion(&amounts, c.total, ctx.currency_decimals);
        let lines = c
            .lines
            .iter()
            .zip(rounded)
            .map(|(line, amount)| CostLine {
                amount,
                ..line.clone()
            })
            .collect();
        CostSummary {
            lines,
            total,
            decimals: ctx.currency_decimals,
        }
    });

    ResultRecord {
        domain: ctx.domain.to_string(),
        unit_system: system,
        extent,
        base_quantity,
        quantity,
        secondary,
        packages,
        details,
        factors: ctx.adjusted.factors,
        cost,
        advisories: ctx.advisories,
    }
}

fn metric_aware(unit: Unit, system: UnitSystem) -> Unit {
    match system {
        UnitSystem::Imperial => unit,
        UnitSystem::Metric => metric_counterpart(unit),
    }
}

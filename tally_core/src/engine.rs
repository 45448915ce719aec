//! # Estimation Pipeline
//!
//! [`compute`] is the single entry point every estimator goes through:
//!
//! ```text
//! InputSet ─► geometry::resolve ─► quantity::derive ─► adjustment::apply
//!                                        │                    │
//!                                        │ (no action)        ▼
//!                                        └──────────► advisory::evaluate ─► format::assemble
//! ```
//!
//! `compute` is a pure function of its two arguments. It holds no state and
//! performs no I/O beyond tracing, so identical inputs always give identical
//! records and calls can run concurrently on separate input sets.

use serde::{Deserialize, Serialize};

use crate::adjustment;
use crate::advisory::{self, Advisory, Facts};
use crate::config::DomainConfig;
use crate::errors::CalcResult;
use crate::format::{self, FormatContext, ResultRecord};
use crate::geometry;
use crate::inputs::InputSet;
use crate::quantity::{self, Derivation};
use crate::units::UnitSystem;

pub use crate::inputs::convert_unit_system;

/// Reported instead of a quantity when a dose would be zero or negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoActionRecord {
    pub domain: String,
    pub unit_system: UnitSystem,
    pub message: String,
    /// Field holding the current level
    pub field: String,
    pub current: f64,
    pub target: f64,
    pub advisories: Vec<Advisory>,
}

/// Outcome of one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Estimate {
    Ready(ResultRecord),
    NoActionNeeded(NoActionRecord),
}

impl Estimate {
    pub fn advisories(&self) -> &[Advisory] {
        match self {
            Estimate::Ready(record) => &record.advisories,
            Estimate::NoActionNeeded(record) => &record.advisories,
        }
    }

    /// The result record, if a quantity was produced
    pub fn record(&self) -> Option<&ResultRecord> {
        match self {
            Estimate::Ready(record) => Some(record),
            Estimate::NoActionNeeded(_) => None,
        }
    }
}

/// Run the full pipeline for one input set.
///
/// The inputs are checked against the domain first
/// ([`DomainConfig::check_inputs`]): an unknown, missing or mistyped field,
/// or a shape entered in units other than the domain's, is reported as an
/// error before anything is computed.
///
/// # Example
///
/// ```rust
/// use tally_core::domains;
/// use tally_core::engine::compute;
/// use tally_core::geometry::GeometrySpec;
/// use tally_core::units::UnitSystem;
///
/// let config = domains::by_name("asphalt-paving").unwrap();
/// let inputs = config
///     .default_inputs(UnitSystem::Imperial)
///     .with_geometry(GeometrySpec::Rectangle { length: 40.0, width: 12.0 })
///     .with_number("thickness", 3.0).unwrap();
///
/// let estimate = compute(&inputs, config).unwrap();
/// let record = estimate.record().unwrap();
/// assert_eq!(record.base_quantity.value, 8.7);
/// ```
pub fn compute(inputs: &InputSet, config: &DomainConfig) -> CalcResult<Estimate> {
    let span = tracing::debug_span!("compute", domain = %config.name, system = %inputs.unit_system);
    let _enter = span.enter();

    config.check_inputs(inputs)?;

    let extent = geometry::resolve(&inputs.geometry, &config.geometry_units, inputs.unit_system);
    tracing::trace!(?extent, "Resolved extent");

    let base = match quantity::derive(&config.quantity, &extent, inputs)? {
        Derivation::Quantity(base) => base,
        Derivation::NoAction(no_action) => {
            let facts = Facts {
                inputs,
                extent: &extent,
                base: None,
                adjusted: None,
            };
            let advisories = advisory::evaluate(&config.advisories, &facts)?;
            return Ok(Estimate::NoActionNeeded(NoActionRecord {
                domain: config.name.clone(),
                unit_system: inputs.unit_system,
                message: config.no_action_message.clone(),
                field: no_action.current_field,
                current: no_action.current,
                target: no_action.target,
                advisories,
            }));
        }
    };

    let adjusted = adjustment::apply(&config.adjustments, config.pricing.as_ref(), &base, &extent, inputs)?;

    let facts = Facts {
        inputs,
        extent: &extent,
        base: Some(&base),
        adjusted: Some(&adjusted),
    };
    let advisories = advisory::evaluate(&config.advisories, &facts)?;

    let record = format::assemble(FormatContext {
        domain: &config.name,
        unit_system: inputs.unit_system,
        extent: &extent,
        geometry_units: &config.geometry_units,
        base: &base,
        adjusted,
        advisories,
        rules: &config.display,
        currency_decimals: config.pricing.as_ref().map_or(2, |p| p.currency_decimals),
    });

    tracing::debug!(
        quantity = record.quantity.value,
        unit = %record.quantity.symbol,
        advisories = record.advisories.len(),
        "Computed estimate"
    );
    Ok(Estimate::Ready(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::Severity;
    use crate::domains;
    use crate::geometry::GeometrySpec;
    use crate::units::{MassUnit, Unit, VolumeUnit};
    use proptest::prelude::*;

    fn paving(length: f64, width: f64, thickness_in: f64) -> InputSet {
        domains::by_name("asphalt-paving")
            .unwrap()
            .default_inputs(UnitSystem::Imperial)
            .with_geometry(GeometrySpec::Rectangle { length, width })
            .with_number("thickness", thickness_in).unwrap()
    }

    fn ready(estimate: Estimate) -> ResultRecord {
        match estimate {
            Estimate::Ready(record) => record,
            Estimate::NoActionNeeded(r) => panic!("expected a quantity, got no-action: {}", r.message),
        }
    }

    #[test]
    fn test_paving_scenario() {
        let config = domains::by_name("asphalt-paving").unwrap();
        let record = ready(compute(&paving(40.0, 12.0, 3.0), config).unwrap());

        assert_eq!(record.extent.value, 480.0);
        assert_eq!(record.base_quantity.value, 8.7);
        assert_eq!(record.base_quantity.unit, Unit::Mass(MassUnit::ShortTons));
        let volume = record.details.iter().find(|d| d.label == "Fill volume").unwrap();
        assert_eq!(volume.measurement.value, 120.0);
        let weight = record.details.iter().find(|d| d.label == "Weight").unwrap();
        assert_eq!(weight.measurement.value, 17400.0);
        assert!(record.advisories.is_empty());
    }

    #[test]
    fn test_paving_breakdown_sums_to_total() {
        let config = domains::by_name("asphalt-paving").unwrap();
        let inputs = paving(40.0, 12.0, 3.0).with_flag("permit", true).with_flag("recycled_base", true);
        let record = ready(compute(&inputs, config).unwrap());
        let cost = record.cost.unwrap();
        let sum: f64 = cost.lines.iter().map(|l| l.amount).sum();
        assert!((sum - cost.total).abs() < 1e-9);
        assert!(cost.total >= 0.0);
        assert!(cost.lines.iter().any(|l| l.amount < 0.0));
    }

    #[test]
    fn test_thin_paving_warns_once() {
        let config = domains::by_name("asphalt-paving").unwrap();
        let record = ready(compute(&paving(40.0, 12.0, 1.5), config).unwrap());
        assert_eq!(record.advisories.len(), 1);
        assert_eq!(record.advisories[0].severity, Severity::Warning);
        assert!(record.advisories[0].message.contains("minimum thickness"));
    }

    #[test]
    fn test_circular_area() {
        let config = domains::by_name("sealcoating").unwrap();
        let inputs = config
            .default_inputs(UnitSystem::Imperial)
            .with_geometry(GeometrySpec::Circle { diameter: 20.0 });
        let record = ready(compute(&inputs, config).unwrap());
        assert_eq!(record.extent.value, 314.16);
    }

    #[test]
    fn test_empty_extent_is_all_zero() {
        let config = domains::by_name("asphalt-paving").unwrap();
        let record = ready(compute(&paving(0.0, 12.0, 3.0).with_flag("permit", true), config).unwrap());
        assert_eq!(record.quantity.value, 0.0);
        assert_eq!(record.cost.unwrap().total, 0.0);
        assert!(record.advisories.iter().all(|a| a.rule_id == "no_area"));
    }

    #[test]
    fn test_chlorine_no_action() {
        let config = domains::by_name("pool-chlorine").unwrap();
        let inputs = config
            .default_inputs(UnitSystem::Imperial)
            .with_number("current_fc", 5.0).unwrap()
            .with_number("target_fc", 4.0).unwrap();
        match compute(&inputs, config).unwrap() {
            Estimate::NoActionNeeded(record) => {
                assert_eq!(record.current, 5.0);
                assert_eq!(record.target, 4.0);
                assert!(!record.message.is_empty());
            }
            Estimate::Ready(r) => panic!("expected no-action, got {} {}", r.quantity.value, r.quantity.symbol),
        }
    }

    #[test]
    fn test_chlorine_dose_promotes_to_gallons() {
        let config = domains::by_name("pool-chlorine").unwrap();
        let inputs = config
            .default_inputs(UnitSystem::Imperial)
            .with_geometry(GeometrySpec::DirectVolume { volume: 20_000.0 })
            .with_number("current_fc", 1.0).unwrap()
            .with_number("target_fc", 8.0).unwrap();
        let record = ready(compute(&inputs, config).unwrap());
        // 7 ppm × 2 × 10.7 fl oz
        assert_eq!(record.base_quantity.value, 149.8);
        let secondary = record.secondary.unwrap();
        assert_eq!(secondary.unit, Unit::Volume(VolumeUnit::Gallons));
        assert_eq!(secondary.value, 1.17);
    }

    #[test]
    fn test_metric_display_of_paving() {
        let config = domains::by_name("asphalt-paving").unwrap();
        let metric = convert_unit_system(&paving(40.0, 12.0, 3.0), UnitSystem::Metric);
        let record = ready(compute(&metric, config).unwrap());
        assert_eq!(record.base_quantity.unit, Unit::Mass(MassUnit::MetricTonnes));
        // 8.7 short tons
        assert!((record.base_quantity.value - 7.89).abs() < 0.006);
        assert!((record.extent.value - 44.59).abs() < 0.006);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let config = domains::by_name("concrete-slab").unwrap();
        let inputs = config
            .default_inputs(UnitSystem::Imperial)
            .with_geometry(GeometrySpec::Rectangle { length: 20.0, width: 20.0 });
        assert_eq!(compute(&inputs, config).unwrap(), compute(&inputs, config).unwrap());
    }

    #[test]
    fn test_every_builtin_computes_defaults() {
        for name in domains::names() {
            let config = domains::by_name(name).unwrap();
            for system in UnitSystem::ALL {
                let inputs = config.default_inputs(system);
                config.check_inputs(&inputs).unwrap();
                compute(&inputs, config).unwrap();
            }
        }
    }

    proptest! {
        #[test]
        fn prop_toggle_preserves_quantity(length in 1.0f64..200.0, width in 1.0f64..200.0, thickness in 0.5f64..8.0) {
            let config = domains::by_name("asphalt-paving").unwrap();
            let imperial = paving(length, width, thickness);
            let metric = convert_unit_system(&imperial, UnitSystem::Metric);
            let a = ready(compute(&imperial, config).unwrap());
            let b = ready(compute(&metric, config).unwrap());
            // both sides are rounded for display
            let tons = b.quantity.value / 0.907_184_74;
            prop_assert!((a.quantity.value - tons).abs() <= 0.12);
        }

        #[test]
        fn prop_quantity_monotone_in_area(width in 1.0f64..100.0, l1 in 1.0f64..100.0, extra in 0.0f64..100.0) {
            let config = domains::by_name("gravel-driveway").unwrap();
            let inputs = |length: f64| {
                config
                    .default_inputs(UnitSystem::Imperial)
                    .with_geometry(GeometrySpec::Rectangle { length, width })
            };
            let a = ready(compute(&inputs(l1), config).unwrap());
            let b = ready(compute(&inputs(l1 + extra), config).unwrap());
            prop_assert!(b.quantity.value >= a.quantity.value);
        }

        #[test]
        fn prop_cost_lines_sum(length in 0.0f64..300.0, width in 0.0f64..300.0, permit in any::<bool>(), recycled in any::<bool>()) {
            let config = domains::by_name("asphalt-paving").unwrap();
            let inputs = paving(length, width, 3.0)
                .with_flag("permit", permit)
                .with_flag("recycled_base", recycled);
            let record = ready(compute(&inputs, config).unwrap());
            let cost = record.cost.unwrap();
            let sum: f64 = cost.lines.iter().map(|l| l.amount).sum();
            prop_assert!((sum - cost.total).abs() < 1e-6);
            prop_assert!(cost.total >= 0.0);
        }
    }
}

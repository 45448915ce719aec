//! # Quantity Derivation
//!
//! Converts a resolved extent plus an intensity (depth, coats, concentration
//! delta) into the base physical quantity a domain deals in, before any
//! adjustment factor is applied.
//!
//! ## Models
//!
//! ```text
//! FillMass:   base = area × depth_ft × density / lb_per_output_unit
//! FillVolume: base = area × depth_ft, expressed in the output unit
//! Coverage:   base = area × coats / coverage_per_unit
//! Dose:       base = (target − current) × (gallons / reference_gallons) × dose
//! ```
//!
//! Every model is monotonic: raising area, depth, coats, density or dose
//! never lowers the result. A dose whose target is at or below the current
//! level yields [`Derivation::NoAction`] rather than a zero or negative dose.

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::geometry::Extent;
use crate::inputs::InputSet;
use crate::tables::Rate;
use crate::units::{CuFt, Feet, Gallons, MassUnit, PhysicalUnit, Pounds, Unit, VolumeUnit};

/// How a domain turns geometry into its base quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum QuantityModel {
    /// Fill material sold by weight (asphalt, gravel)
    FillMass {
        depth_field: String,
        /// Density in lb/ft³
        density: Rate,
        unit: MassUnit,
    },
    /// Fill material sold by volume (concrete, mulch)
    FillVolume { depth_field: String, unit: VolumeUnit },
    /// Surface treatment sold by spread rate (sealer, paint)
    Coverage {
        #[serde(default)]
        coats_field: Option<String>,
        /// Square feet covered by one output unit
        coverage_sqft_per_unit: Rate,
        unit: Unit,
    },
    /// Chemical raising a concentration in a body of water
    Dose {
        current_field: String,
        target_field: String,
        /// Average water depth, required when the extent is an area
        #[serde(default)]
        depth_field: Option<String>,
        reference_gallons: f64,
        /// Output units per concentration unit per reference volume
        dose_per_reference: Rate,
        unit: Unit,
    },
}

impl QuantityModel {
    /// Unit the base quantity is reported in
    pub fn unit(&self) -> Unit {
        match self {
            QuantityModel::FillMass { unit, .. } => Unit::Mass(*unit),
            QuantityModel::FillVolume { unit, .. } => Unit::Volume(*unit),
            QuantityModel::Coverage { unit, .. } | QuantityModel::Dose { unit, .. } => *unit,
        }
    }

    /// Fields the model reads
    pub fn field_refs(&self) -> Vec<&str> {
        match self {
            QuantityModel::FillMass { depth_field, .. } | QuantityModel::FillVolume { depth_field, .. } => {
                vec![depth_field.as_str()]
            }
            QuantityModel::Coverage { coats_field, .. } => coats_field.iter().map(String::as_str).collect(),
            QuantityModel::Dose {
                current_field,
                target_field,
                depth_field,
                ..
            } => {
                let mut refs = vec![current_field.as_str(), target_field.as_str()];
                refs.extend(depth_field.iter().map(String::as_str));
                refs
            }
        }
    }

    /// Rates the model looks up
    pub fn rates(&self) -> Vec<&Rate> {
        match self {
            QuantityModel::FillMass { density, .. } => vec![density],
            QuantityModel::FillVolume { .. } => vec![],
            QuantityModel::Coverage { coverage_sqft_per_unit, .. } => vec![coverage_sqft_per_unit],
            QuantityModel::Dose { dose_per_reference, .. } => vec![dose_per_reference],
        }
    }
}

/// The base quantity and the intermediates that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseQuantity {
    pub value: f64,
    pub unit: Unit,
    /// Fill volume (FillMass, FillVolume)
    pub fill_volume: Option<CuFt>,
    /// Material weight (FillMass)
    pub weight: Option<Pounds>,
    /// Treated water volume (Dose)
    pub water_volume: Option<Gallons>,
    /// Concentration increase (Dose)
    pub concentration_delta: Option<f64>,
}

impl BaseQuantity {
    fn plain(value: f64, unit: Unit) -> Self {
        BaseQuantity {
            value,
            unit,
            fill_volume: None,
            weight: None,
            water_volume: None,
            concentration_delta: None,
        }
    }
}

/// A dose that would be zero or negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoAction {
    pub current_field: String,
    pub current: f64,
    pub target: f64,
}

/// Outcome of quantity derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Derivation {
    Quantity(BaseQuantity),
    NoAction(NoAction),
}

/// Derive the base quantity for an extent.
///
/// # Example
///
/// ```rust
/// use tally_core::quantity::{derive, Derivation, QuantityModel};
/// use tally_core::geometry::{Extent, GeometryUnits};
/// use tally_core::inputs::{FieldSpec, InputSet};
/// use tally_core::tables::Rate;
/// use tally_core::units::{LengthUnit, MassUnit, SqFt, UnitPair, UnitSystem};
///
/// let schema = vec![FieldSpec::measure(
///     "depth", "Depth", UnitPair::length(LengthUnit::Inches, LengthUnit::Centimeters), 3.0,
/// )];
/// let inputs = InputSet::from_schema(&schema, GeometryUnits::default(), UnitSystem::Imperial);
/// let model = QuantityModel::FillMass {
///     depth_field: "depth".to_string(),
///     density: Rate::fixed(145.0),
///     unit: MassUnit::ShortTons,
/// };
///
/// match derive(&model, &Extent::Area(SqFt(480.0)), &inputs).unwrap() {
///     Derivation::Quantity(q) => assert!((q.value - 8.7).abs() < 1e-9),
///     Derivation::NoAction(_) => unreachable!(),
/// }
/// ```
pub fn derive(model: &QuantityModel, extent: &Extent, inputs: &InputSet) -> CalcResult<Derivation> {
    let derivation = match model {
        QuantityModel::FillMass { depth_field, density, unit } => {
            let depth = Feet(inputs.canonical(depth_field)?);
            let volume = extent.volume_through(depth);
            let weight = Pounds(volume.0 * density.resolve(inputs)?);
            Derivation::Quantity(BaseQuantity {
                fill_volume: Some(volume),
                weight: Some(weight),
                ..BaseQuantity::plain(unit.from_canonical(weight.0), Unit::Mass(*unit))
            })
        }
        QuantityModel::FillVolume { depth_field, unit } => {
            let depth = Feet(inputs.canonical(depth_field)?);
            let volume = extent.volume_through(depth);
            let value = unit.from_canonical(VolumeUnit::CubicFeet.to_canonical(volume.0));
            Derivation::Quantity(BaseQuantity {
                fill_volume: Some(volume),
                ..BaseQuantity::plain(value, Unit::Volume(*unit))
            })
        }
        QuantityModel::Coverage {
            coats_field,
            coverage_sqft_per_unit,
            unit,
        } => {
            let area = extent.area().map(|a| a.0).unwrap_or(0.0);
            let coats = match coats_field {
                Some(field) => inputs.canonical(field)?,
                None => 1.0,
            };
            let rate = coverage_sqft_per_unit.resolve(inputs)?;
            let value = if rate > 0.0 { area * coats / rate } else { 0.0 };
            Derivation::Quantity(BaseQuantity::plain(value, *unit))
        }
        QuantityModel::Dose {
            current_field,
            target_field,
            depth_field,
            reference_gallons,
            dose_per_reference,
            unit,
        } => {
            let current = inputs.canonical(current_field)?;
            let target = inputs.canonical(target_field)?;
            let delta = target - current;
            if delta <= 0.0 {
                tracing::info!(current, target, "Target already reached, no dose needed");
                return Ok(Derivation::NoAction(NoAction {
                    current_field: current_field.clone(),
                    current,
                    target,
                }));
            }

            let depth = match depth_field {
                Some(field) => Feet(inputs.canonical(field)?),
                None => Feet(0.0),
            };
            let water: Gallons = extent.volume_through(depth).into();
            let dose = dose_per_reference.resolve(inputs)?;
            let value = if *reference_gallons > 0.0 {
                delta * (water.0 / reference_gallons) * dose
            } else {
                0.0
            };
            Derivation::Quantity(BaseQuantity {
                water_volume: Some(water),
                concentration_delta: Some(delta),
                ..BaseQuantity::plain(value, *unit)
            })
        }
    };

    if let Derivation::Quantity(q) = &derivation {
        tracing::debug!(value = q.value, unit = q.unit.symbol(), "Derived base quantity");
    }
    Ok(derivation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryUnits;
    use crate::inputs::FieldSpec;
    use crate::units::{LengthUnit, SqFt, UnitPair, UnitSystem};
    use proptest::prelude::*;

    fn fill_inputs(depth_in: f64) -> InputSet {
        let schema = vec![
            FieldSpec::measure(
                "depth",
                "Depth",
                UnitPair::length(LengthUnit::Inches, LengthUnit::Centimeters),
                depth_in,
            ),
            FieldSpec::number("coats", "Coats", None, 2.0),
        ];
        InputSet::from_schema(&schema, GeometryUnits::default(), UnitSystem::Imperial)
    }

    fn pool_inputs(current: f64, target: f64) -> InputSet {
        let schema = vec![
            FieldSpec::number("current_fc", "Current FC", Some("ppm"), current),
            FieldSpec::number("target_fc", "Target FC", Some("ppm"), target),
        ];
        InputSet::from_schema(&schema, GeometryUnits::liquid(), UnitSystem::Imperial)
    }

    fn paving() -> QuantityModel {
        QuantityModel::FillMass {
            depth_field: "depth".to_string(),
            density: Rate::fixed(145.0),
            unit: MassUnit::ShortTons,
        }
    }

    fn chlorine() -> QuantityModel {
        QuantityModel::Dose {
            current_field: "current_fc".to_string(),
            target_field: "target_fc".to_string(),
            depth_field: None,
            reference_gallons: 10_000.0,
            dose_per_reference: Rate::fixed(10.7),
            unit: Unit::Volume(VolumeUnit::FluidOunces),
        }
    }

    fn quantity(d: Derivation) -> BaseQuantity {
        match d {
            Derivation::Quantity(q) => q,
            Derivation::NoAction(n) => panic!("unexpected no-action: {n:?}"),
        }
    }

    #[test]
    fn test_rectangular_paving_scenario() {
        let q = quantity(derive(&paving(), &Extent::Area(SqFt(480.0)), &fill_inputs(3.0)).unwrap());
        assert_eq!(q.fill_volume, Some(CuFt(120.0)));
        assert!((q.weight.unwrap().0 - 17_400.0).abs() < 1e-9);
        assert!((q.value - 8.7).abs() < 1e-9);
        assert_eq!(q.unit, Unit::Mass(MassUnit::ShortTons));
    }

    #[test]
    fn test_fill_volume_cubic_yards() {
        let model = QuantityModel::FillVolume {
            depth_field: "depth".to_string(),
            unit: VolumeUnit::CubicYards,
        };
        // 324 ft² × 4 in = 108 ft³ = 4 yd³
        let q = quantity(derive(&model, &Extent::Area(SqFt(324.0)), &fill_inputs(4.0)).unwrap());
        assert!((q.value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_with_coats() {
        let model = QuantityModel::Coverage {
            coats_field: Some("coats".to_string()),
            coverage_sqft_per_unit: Rate::fixed(80.0),
            unit: Unit::Volume(VolumeUnit::Gallons),
        };
        let q = quantity(derive(&model, &Extent::Area(SqFt(800.0)), &fill_inputs(0.0)).unwrap());
        assert!((q.value - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_dose_from_direct_volume() {
        // 20,000 gallons, +2 ppm at 10.7 fl oz per ppm per 10k gal
        let extent = Extent::Volume(Gallons(20_000.0).into());
        let q = quantity(derive(&chlorine(), &extent, &pool_inputs(1.0, 3.0)).unwrap());
        assert!((q.value - 42.8).abs() < 1e-6);
        assert_eq!(q.concentration_delta, Some(2.0));
    }

    #[test]
    fn test_dose_no_action() {
        let extent = Extent::Volume(Gallons(15_000.0).into());
        match derive(&chlorine(), &extent, &pool_inputs(5.0, 4.0)).unwrap() {
            Derivation::NoAction(n) => {
                assert_eq!(n.current, 5.0);
                assert_eq!(n.target, 4.0);
            }
            Derivation::Quantity(q) => panic!("expected no-action, got {q:?}"),
        }
        // at target is also no action
        assert!(matches!(
            derive(&chlorine(), &extent, &pool_inputs(4.0, 4.0)).unwrap(),
            Derivation::NoAction(_)
        ));
    }

    #[test]
    fn test_missing_depth_field() {
        let inputs = InputSet::new(UnitSystem::Imperial);
        let err = derive(&paving(), &Extent::Area(SqFt(10.0)), &inputs).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    proptest! {
        #[test]
        fn prop_fill_mass_monotonic(area in 0.0f64..1e5, extra in 0.0f64..1e4, depth in 0.0f64..24.0, more_depth in 0.0f64..12.0) {
            let base = quantity(derive(&paving(), &Extent::Area(SqFt(area)), &fill_inputs(depth)).unwrap()).value;
            let bigger_area = quantity(derive(&paving(), &Extent::Area(SqFt(area + extra)), &fill_inputs(depth)).unwrap()).value;
            let deeper = quantity(derive(&paving(), &Extent::Area(SqFt(area)), &fill_inputs(depth + more_depth)).unwrap()).value;
            prop_assert!(bigger_area >= base);
            prop_assert!(deeper >= base);
        }

        #[test]
        fn prop_dose_monotonic_in_volume(gal in 1.0f64..1e5, extra in 0.0f64..1e5, target in 1.1f64..10.0) {
            let inputs = pool_inputs(1.0, target);
            let small = quantity(derive(&chlorine(), &Extent::Volume(Gallons(gal).into()), &inputs).unwrap()).value;
            let large = quantity(derive(&chlorine(), &Extent::Volume(Gallons(gal + extra).into()), &inputs).unwrap()).value;
            prop_assert!(large >= small);
            prop_assert!(small > 0.0);
        }
    }
}

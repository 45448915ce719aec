//! # Unit Types
//!
//! Unit enums, the imperial/metric [`UnitSystem`] switch, and lightweight
//! newtype wrappers for the canonical quantities the engine computes in.
//!
//! ## Canonical Units
//!
//! Every computation runs in a single internal unit per dimension:
//! - Length: feet (ft)
//! - Area: square feet (ft²)
//! - Mass: pounds (lb)
//! - Volume: US fluid ounces (fl oz), for both liquids and bulk fill
//!
//! Display units are converted to canonical with [`PhysicalUnit::to_canonical`]
//! and back with [`PhysicalUnit::from_canonical`]. Factors are exact
//! definitions (1 ft = 0.3048 m, 1 lb = 453.59237 g, 1 gal = 231 in³ = 128 fl oz).
//!
//! ## Example
//!
//! ```rust
//! use tally_core::units::{CuFt, Gallons, LengthUnit, PhysicalUnit};
//!
//! let ft = LengthUnit::Meters.to_canonical(3.048);
//! assert!((ft - 10.0).abs() < 1e-9);
//!
//! let water: Gallons = CuFt(100.0).into();
//! assert!((water.0 - 748.05).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Meters per foot (exact, international foot)
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Grams per pound (exact, international avoirdupois pound)
pub const GRAMS_PER_POUND: f64 = 453.59237;

/// Milliliters per US fluid ounce (exact)
pub const ML_PER_FL_OZ: f64 = 29.5735295625;

/// US fluid ounces per US gallon
pub const FL_OZ_PER_GALLON: f64 = 128.0;

/// US gallons per cubic foot (1728 in³ / 231 in³)
pub const GALLONS_PER_CUBIC_FOOT: f64 = 1728.0 / 231.0;

/// Pounds per short (US) ton
pub const POUNDS_PER_TON: f64 = 2000.0;

// ============================================================================
// Unit System
// ============================================================================

/// Which family of display units raw numeric inputs are interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitSystem {
    /// Feet, inches, pounds, gallons
    #[default]
    Imperial,
    /// Meters, centimeters, kilograms, liters
    Metric,
}

impl UnitSystem {
    /// All unit systems for UI selection
    pub const ALL: [UnitSystem; 2] = [UnitSystem::Imperial, UnitSystem::Metric];

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "Imperial",
            UnitSystem::Metric => "Metric",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Unit Enums
// ============================================================================

/// Conversion contract shared by every unit enum.
///
/// `factor()` is the number of canonical units in one of `self`, so
/// `to_canonical` multiplies and `from_canonical` divides.
pub trait PhysicalUnit: Copy {
    /// Canonical units per one of this unit
    fn factor(self) -> f64;

    /// Short symbol for display ("ft", "kg", "fl oz")
    fn symbol(self) -> &'static str;

    /// Convert a value in this unit to the canonical unit
    fn to_canonical(self, value: f64) -> f64 {
        value * self.factor()
    }

    /// Convert a canonical value to this unit
    fn from_canonical(self, value: f64) -> f64 {
        value / self.factor()
    }
}

/// Length units (canonical: feet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    Inches,
    Feet,
    Yards,
    Millimeters,
    Centimeters,
    Meters,
}

impl PhysicalUnit for LengthUnit {
    fn factor(self) -> f64 {
        match self {
            LengthUnit::Inches => 1.0 / 12.0,
            LengthUnit::Feet => 1.0,
            LengthUnit::Yards => 3.0,
            LengthUnit::Millimeters => 0.001 / METERS_PER_FOOT,
            LengthUnit::Centimeters => 0.01 / METERS_PER_FOOT,
            LengthUnit::Meters => 1.0 / METERS_PER_FOOT,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
            LengthUnit::Yards => "yd",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
        }
    }
}

/// Area units (canonical: square feet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaUnit {
    SquareFeet,
    SquareYards,
    Acres,
    SquareMeters,
}

impl PhysicalUnit for AreaUnit {
    fn factor(self) -> f64 {
        match self {
            AreaUnit::SquareFeet => 1.0,
            AreaUnit::SquareYards => 9.0,
            AreaUnit::Acres => 43_560.0,
            AreaUnit::SquareMeters => 1.0 / (METERS_PER_FOOT * METERS_PER_FOOT),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            AreaUnit::SquareFeet => "ft²",
            AreaUnit::SquareYards => "yd²",
            AreaUnit::Acres => "ac",
            AreaUnit::SquareMeters => "m²",
        }
    }
}

/// Mass units (canonical: pounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassUnit {
    Ounces,
    Pounds,
    ShortTons,
    Grams,
    Kilograms,
    MetricTonnes,
}

impl PhysicalUnit for MassUnit {
    fn factor(self) -> f64 {
        match self {
            MassUnit::Ounces => 1.0 / 16.0,
            MassUnit::Pounds => 1.0,
            MassUnit::ShortTons => POUNDS_PER_TON,
            MassUnit::Grams => 1.0 / GRAMS_PER_POUND,
            MassUnit::Kilograms => 1000.0 / GRAMS_PER_POUND,
            MassUnit::MetricTonnes => 1_000_000.0 / GRAMS_PER_POUND,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MassUnit::Ounces => "oz",
            MassUnit::Pounds => "lb",
            MassUnit::ShortTons => "tons",
            MassUnit::Grams => "g",
            MassUnit::Kilograms => "kg",
            MassUnit::MetricTonnes => "t",
        }
    }
}

/// Volume units (canonical: US fluid ounces)
///
/// Bulk fill volumes (cubic feet/yards/meters) share the dimension with
/// liquid volumes so a pool measured in cubic feet can be dosed in gallons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeUnit {
    FluidOunces,
    Quarts,
    Gallons,
    CubicFeet,
    CubicYards,
    Milliliters,
    Liters,
    CubicMeters,
}

impl PhysicalUnit for VolumeUnit {
    fn factor(self) -> f64 {
        match self {
            VolumeUnit::FluidOunces => 1.0,
            VolumeUnit::Quarts => 32.0,
            VolumeUnit::Gallons => FL_OZ_PER_GALLON,
            VolumeUnit::CubicFeet => GALLONS_PER_CUBIC_FOOT * FL_OZ_PER_GALLON,
            VolumeUnit::CubicYards => 27.0 * GALLONS_PER_CUBIC_FOOT * FL_OZ_PER_GALLON,
            VolumeUnit::Milliliters => 1.0 / ML_PER_FL_OZ,
            VolumeUnit::Liters => 1000.0 / ML_PER_FL_OZ,
            VolumeUnit::CubicMeters => 1_000_000.0 / ML_PER_FL_OZ,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            VolumeUnit::FluidOunces => "fl oz",
            VolumeUnit::Quarts => "qt",
            VolumeUnit::Gallons => "gal",
            VolumeUnit::CubicFeet => "ft³",
            VolumeUnit::CubicYards => "yd³",
            VolumeUnit::Milliliters => "mL",
            VolumeUnit::Liters => "L",
            VolumeUnit::CubicMeters => "m³",
        }
    }
}

/// Any physical unit, tagged with its dimension.
///
/// ```json
/// { "dimension": "Length", "unit": "Inches" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "unit")]
pub enum Unit {
    Length(LengthUnit),
    Area(AreaUnit),
    Mass(MassUnit),
    Volume(VolumeUnit),
}

impl Unit {
    /// Name of the physical dimension
    pub fn dimension(&self) -> &'static str {
        match self {
            Unit::Length(_) => "Length",
            Unit::Area(_) => "Area",
            Unit::Mass(_) => "Mass",
            Unit::Volume(_) => "Volume",
        }
    }

    pub fn same_dimension(&self, other: &Unit) -> bool {
        self.dimension() == other.dimension()
    }
}

impl PhysicalUnit for Unit {
    fn factor(self) -> f64 {
        match self {
            Unit::Length(u) => u.factor(),
            Unit::Area(u) => u.factor(),
            Unit::Mass(u) => u.factor(),
            Unit::Volume(u) => u.factor(),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Length(u) => u.symbol(),
            Unit::Area(u) => u.symbol(),
            Unit::Mass(u) => u.symbol(),
            Unit::Volume(u) => u.symbol(),
        }
    }
}

/// The display unit a measured field uses in each unit system.
///
/// Both sides always belong to the same dimension; the constructors are the
/// only way to build a pair in code, and `DomainConfig::validate` rejects
/// mismatched pairs loaded from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitPair {
    pub imperial: Unit,
    pub metric: Unit,
}

impl UnitPair {
    pub fn length(imperial: LengthUnit, metric: LengthUnit) -> Self {
        UnitPair {
            imperial: Unit::Length(imperial),
            metric: Unit::Length(metric),
        }
    }

    pub fn area(imperial: AreaUnit, metric: AreaUnit) -> Self {
        UnitPair {
            imperial: Unit::Area(imperial),
            metric: Unit::Area(metric),
        }
    }

    pub fn mass(imperial: MassUnit, metric: MassUnit) -> Self {
        UnitPair {
            imperial: Unit::Mass(imperial),
            metric: Unit::Mass(metric),
        }
    }

    pub fn volume(imperial: VolumeUnit, metric: VolumeUnit) -> Self {
        UnitPair {
            imperial: Unit::Volume(imperial),
            metric: Unit::Volume(metric),
        }
    }

    /// The display unit for a unit system
    pub fn for_system(&self, system: UnitSystem) -> Unit {
        match system {
            UnitSystem::Imperial => self.imperial,
            UnitSystem::Metric => self.metric,
        }
    }

    /// Re-express a value entered in `from` units as the physically
    /// equivalent value in `to` units.
    pub fn convert(&self, value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
        if from == to {
            return value;
        }
        let canonical = self.for_system(from).to_canonical(value);
        self.for_system(to).from_canonical(canonical)
    }

    pub fn is_consistent(&self) -> bool {
        self.imperial.same_dimension(&self.metric)
    }
}

// ============================================================================
// Canonical Newtypes
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

/// Volume in cubic feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuFt(pub f64);

/// Liquid volume in US gallons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gallons(pub f64);

impl From<CuFt> for Gallons {
    fn from(cuft: CuFt) -> Self {
        Gallons(cuft.0 * GALLONS_PER_CUBIC_FOOT)
    }
}

impl From<Gallons> for CuFt {
    fn from(gal: Gallons) -> Self {
        CuFt(gal.0 / GALLONS_PER_CUBIC_FOOT)
    }
}

/// Mass in pounds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pounds(pub f64);

impl Feet {
    /// Square of a length gives an area
    pub fn times(self, other: Feet) -> SqFt {
        SqFt(self.0 * other.0)
    }
}

impl SqFt {
    /// Area extruded through a depth gives a volume
    pub fn times(self, depth: Feet) -> CuFt {
        CuFt(self.0 * depth.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(SqFt);
impl_arithmetic!(CuFt);
impl_arithmetic!(Gallons);
impl_arithmetic!(Pounds);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LENGTHS: [LengthUnit; 6] = [
        LengthUnit::Inches,
        LengthUnit::Feet,
        LengthUnit::Yards,
        LengthUnit::Millimeters,
        LengthUnit::Centimeters,
        LengthUnit::Meters,
    ];
    const AREAS: [AreaUnit; 4] = [
        AreaUnit::SquareFeet,
        AreaUnit::SquareYards,
        AreaUnit::Acres,
        AreaUnit::SquareMeters,
    ];
    const MASSES: [MassUnit; 6] = [
        MassUnit::Ounces,
        MassUnit::Pounds,
        MassUnit::ShortTons,
        MassUnit::Grams,
        MassUnit::Kilograms,
        MassUnit::MetricTonnes,
    ];
    const VOLUMES: [VolumeUnit; 8] = [
        VolumeUnit::FluidOunces,
        VolumeUnit::Quarts,
        VolumeUnit::Gallons,
        VolumeUnit::CubicFeet,
        VolumeUnit::CubicYards,
        VolumeUnit::Milliliters,
        VolumeUnit::Liters,
        VolumeUnit::CubicMeters,
    ];

    fn all_units() -> Vec<Unit> {
        LENGTHS
            .iter()
            .map(|u| Unit::Length(*u))
            .chain(AREAS.iter().map(|u| Unit::Area(*u)))
            .chain(MASSES.iter().map(|u| Unit::Mass(*u)))
            .chain(VOLUMES.iter().map(|u| Unit::Volume(*u)))
            .collect()
    }

    #[test]
    fn test_exact_definitions() {
        assert!((LengthUnit::Feet.from_canonical(1.0) - 1.0).abs() < 1e-12);
        assert!((LengthUnit::Meters.from_canonical(1.0) - 0.3048).abs() < 1e-12);
        assert!((MassUnit::Grams.from_canonical(1.0) - 453.59237).abs() < 1e-9);
        assert!((VolumeUnit::Gallons.to_canonical(1.0) - 128.0).abs() < 1e-12);
        assert!((VolumeUnit::Milliliters.from_canonical(1.0) - 29.5735295625).abs() < 1e-9);
    }

    #[test]
    fn test_cubic_foot_in_gallons() {
        let gal = VolumeUnit::Gallons.from_canonical(VolumeUnit::CubicFeet.to_canonical(1.0));
        assert!((gal - 7.480519).abs() < 1e-6);
        let gallons: Gallons = CuFt(1.0).into();
        assert!((gallons.0 - 7.480519).abs() < 1e-6);
    }

    #[test]
    fn test_unit_pair_convert() {
        let pair = UnitPair::length(LengthUnit::Inches, LengthUnit::Centimeters);
        let cm = pair.convert(3.0, UnitSystem::Imperial, UnitSystem::Metric);
        assert!((cm - 7.62).abs() < 1e-9);
        assert_eq!(pair.convert(3.0, UnitSystem::Metric, UnitSystem::Metric), 3.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Feet(10.0);
        let b = Feet(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
        assert_eq!(a.times(b), SqFt(50.0));
        assert_eq!(SqFt(50.0).times(Feet(0.5)), CuFt(25.0));
    }

    #[test]
    fn test_unit_serialization() {
        let unit = Unit::Length(LengthUnit::Inches);
        let json = serde_json::to_string(&unit).unwrap();
        assert_eq!(json, r#"{"dimension":"Length","unit":"Inches"}"#);
        let roundtrip: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(unit, roundtrip);

        let ft = Feet(12.5);
        assert_eq!(serde_json::to_string(&ft).unwrap(), "12.5");
    }

    #[test]
    fn test_mismatched_pair_detected() {
        let pair = UnitPair {
            imperial: Unit::Length(LengthUnit::Feet),
            metric: Unit::Mass(MassUnit::Kilograms),
        };
        assert!(!pair.is_consistent());
        assert!(UnitPair::mass(MassUnit::Pounds, MassUnit::Kilograms).is_consistent());
    }

    proptest! {
        #[test]
        fn prop_round_trip_every_unit(x in 1e-6f64..1e9, idx in 0usize..24) {
            let units = all_units();
            let unit = units[idx % units.len()];
            let back = unit.from_canonical(unit.to_canonical(x));
            prop_assert!(((back - x) / x).abs() < 1e-6);
        }

        #[test]
        fn prop_pair_round_trip(x in 1e-6f64..1e9) {
            let pair = UnitPair::volume(VolumeUnit::Gallons, VolumeUnit::Liters);
            let metric = pair.convert(x, UnitSystem::Imperial, UnitSystem::Metric);
            let back = pair.convert(metric, UnitSystem::Metric, UnitSystem::Imperial);
            prop_assert!(((back - x) / x).abs() < 1e-6);
        }
    }
}

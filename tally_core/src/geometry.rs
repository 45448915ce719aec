//! # Geometry Resolution
//!
//! Turns one of the supported shape-input modes into a single canonical
//! extent: an area in square feet, or a volume in cubic feet.
//!
//! ## Shapes
//!
//! | Shape          | Formula                                   |
//! |----------------|-------------------------------------------|
//! | `Rectangle`    | `length × width`                          |
//! | `Compound`     | `area(primary) + area(secondary)`         |
//! | `Circle`       | `π × (diameter / 2)²`                     |
//! | `DirectArea`   | pass-through                              |
//! | `DirectVolume` | pass-through                              |
//!
//! `Compound` is an L-shape entered as two rectangles. The two areas are
//! summed with no overlap correction, so the caller must enter
//! non-overlapping rectangles for the result to equal the true polygon area.
//!
//! Non-positive or non-finite dimensions resolve to zero instead of failing.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::geometry::{resolve, GeometrySpec, GeometryUnits, Extent};
//! use tally_core::units::UnitSystem;
//!
//! let spec = GeometrySpec::Circle { diameter: 20.0 };
//! let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Imperial);
//! match extent {
//!     Extent::Area(a) => assert!((a.0 - 314.16).abs() < 0.01),
//!     Extent::Volume(_) => unreachable!(),
//! }
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::units::{
    AreaUnit, CuFt, Feet, LengthUnit, PhysicalUnit, SqFt, Unit, UnitPair, UnitSystem, VolumeUnit,
};

/// A plain rectangle, used on its own or as half of an L-shape
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub length: f64,
    pub width: f64,
}

impl Rect {
    pub fn new(length: f64, width: f64) -> Self {
        Rect { length, width }
    }
}

/// Shape input, in the display units of the session's unit system.
///
/// ## JSON Example
///
/// ```json
/// { "shape": "Compound",
///   "primary": { "length": 30.0, "width": 12.0 },
///   "secondary": { "length": 10.0, "width": 8.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape")]
pub enum GeometrySpec {
    Rectangle { length: f64, width: f64 },
    Compound { primary: Rect, secondary: Rect },
    Circle { diameter: f64 },
    DirectArea { area: f64 },
    DirectVolume { volume: f64 },
}

impl Default for GeometrySpec {
    fn default() -> Self {
        GeometrySpec::Rectangle {
            length: 0.0,
            width: 0.0,
        }
    }
}

impl GeometrySpec {
    /// Short name of the shape mode
    pub fn mode(&self) -> &'static str {
        match self {
            GeometrySpec::Rectangle { .. } => "Rectangle",
            GeometrySpec::Compound { .. } => "Compound",
            GeometrySpec::Circle { .. } => "Circle",
            GeometrySpec::DirectArea { .. } => "DirectArea",
            GeometrySpec::DirectVolume { .. } => "DirectVolume",
        }
    }

    /// Apply `f` to every numeric dimension, keeping the shape
    fn map(&self, f: impl Fn(Dim, f64) -> f64) -> Self {
        match *self {
            GeometrySpec::Rectangle { length, width } => GeometrySpec::Rectangle {
                length: f(Dim::Length, length),
                width: f(Dim::Length, width),
            },
            GeometrySpec::Compound { primary, secondary } => GeometrySpec::Compound {
                primary: Rect::new(f(Dim::Length, primary.length), f(Dim::Length, primary.width)),
                secondary: Rect::new(f(Dim::Length, secondary.length), f(Dim::Length, secondary.width)),
            },
            GeometrySpec::Circle { diameter } => GeometrySpec::Circle {
                diameter: f(Dim::Length, diameter),
            },
            GeometrySpec::DirectArea { area } => GeometrySpec::DirectArea {
                area: f(Dim::Area, area),
            },
            GeometrySpec::DirectVolume { volume } => GeometrySpec::DirectVolume {
                volume: f(Dim::Volume, volume),
            },
        }
    }

    /// All dimensions in declaration order
    pub fn dimensions(&self) -> Vec<f64> {
        match *self {
            GeometrySpec::Rectangle { length, width } => vec![length, width],
            GeometrySpec::Compound { primary, secondary } => {
                vec![primary.length, primary.width, secondary.length, secondary.width]
            }
            GeometrySpec::Circle { diameter } => vec![diameter],
            GeometrySpec::DirectArea { area } => vec![area],
            GeometrySpec::DirectVolume { volume } => vec![volume],
        }
    }

    /// Replace negative dimensions with zero.
    pub fn clamped(&self) -> Self {
        self.map(|_, v| v.max(0.0))
    }

    /// Re-express every dimension in the other unit system
    pub fn converted(&self, units: &GeometryUnits, from: UnitSystem, to: UnitSystem) -> Self {
        self.map(|dim, v| units.pair(dim).convert(v, from, to))
    }
}

#[derive(Debug, Clone, Copy)]
enum Dim {
    Length,
    Area,
    Volume,
}

/// Display units for geometry dimensions per unit system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryUnits {
    pub length: UnitPair,
    pub area: UnitPair,
    pub volume: UnitPair,
}

impl Default for GeometryUnits {
    fn default() -> Self {
        GeometryUnits {
            length: UnitPair::length(LengthUnit::Feet, LengthUnit::Meters),
            area: UnitPair::area(AreaUnit::SquareFeet, AreaUnit::SquareMeters),
            volume: UnitPair::volume(VolumeUnit::CubicFeet, VolumeUnit::CubicMeters),
        }
    }
}

impl GeometryUnits {
    /// Geometry units for liquid bodies entered directly as gallons or liters
    pub fn liquid() -> Self {
        GeometryUnits {
            volume: UnitPair::volume(VolumeUnit::Gallons, VolumeUnit::Liters),
            ..GeometryUnits::default()
        }
    }

    fn pair(&self, dim: Dim) -> UnitPair {
        match dim {
            Dim::Length => self.length,
            Dim::Area => self.area,
            Dim::Volume => self.volume,
        }
    }

    /// Describe the first pair that is mixed or sits in the wrong slot
    pub fn problem(&self) -> Option<String> {
        let slots = [
            ("length", self.length, "Length"),
            ("area", self.area, "Area"),
            ("volume", self.volume, "Volume"),
        ];
        slots.into_iter().find_map(|(slot, pair, dimension)| {
            if !pair.is_consistent() {
                Some(format!("{slot} units pair different dimensions"))
            } else if pair.imperial.dimension() != dimension {
                Some(format!("{slot} units must be {dimension} units, not {}", pair.imperial.dimension()))
            } else {
                None
            }
        })
    }
}

/// A resolved canonical extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Extent {
    Area(SqFt),
    Volume(CuFt),
}

impl Extent {
    /// True when the extent carries no area or volume
    pub fn is_empty(&self) -> bool {
        match self {
            Extent::Area(a) => a.0 <= 0.0,
            Extent::Volume(v) => v.0 <= 0.0,
        }
    }

    /// Area in square feet, if this extent is an area
    pub fn area(&self) -> Option<SqFt> {
        match self {
            Extent::Area(a) => Some(*a),
            Extent::Volume(_) => None,
        }
    }

    /// Volume, extruding an area through `depth` when needed
    pub fn volume_through(&self, depth: Feet) -> CuFt {
        match self {
            Extent::Area(a) => a.times(Feet(depth.0.max(0.0))),
            Extent::Volume(v) => *v,
        }
    }
}

fn positive(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn rect_area(rect: Rect, length_unit: LengthUnit) -> SqFt {
    let length = Feet(length_unit.to_canonical(positive(rect.length)));
    let width = Feet(length_unit.to_canonical(positive(rect.width)));
    length.times(width)
}

/// Resolve a shape to its canonical extent.
///
/// Dimensions are read in the display units `units` assigns to `system`.
pub fn resolve(spec: &GeometrySpec, units: &GeometryUnits, system: UnitSystem) -> Extent {
    let length_unit = match units.length.for_system(system) {
        Unit::Length(u) => u,
        // rejected by DomainConfig::validate
        _ => LengthUnit::Feet,
    };

    match *spec {
        GeometrySpec::Rectangle { length, width } => {
            Extent::Area(rect_area(Rect::new(length, width), length_unit))
        }
        GeometrySpec::Compound { primary, secondary } => {
            Extent::Area(rect_area(primary, length_unit) + rect_area(secondary, length_unit))
        }
        GeometrySpec::Circle { diameter } => {
            let radius = length_unit.to_canonical(positive(diameter)) / 2.0;
            Extent::Area(SqFt(PI * radius * radius))
        }
        GeometrySpec::DirectArea { area } => {
            let unit = units.area.for_system(system);
            Extent::Area(SqFt(unit.to_canonical(positive(area))))
        }
        GeometrySpec::DirectVolume { volume } => {
            let canonical = units.volume.for_system(system).to_canonical(positive(volume));
            Extent::Volume(CuFt(VolumeUnit::CubicFeet.from_canonical(canonical)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::MassUnit;

    fn area_of(extent: Extent) -> f64 {
        extent.area().map(|a| a.0).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_rectangle_imperial() {
        let spec = GeometrySpec::Rectangle { length: 40.0, width: 12.0 };
        let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Imperial);
        assert!((area_of(extent) - 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangle_metric_converts_to_feet_first() {
        // 10 m × 5 m = 50 m² = 538.196 ft²
        let spec = GeometrySpec::Rectangle { length: 10.0, width: 5.0 };
        let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Metric);
        assert!((area_of(extent) - 538.1955).abs() < 1e-3);
    }

    #[test]
    fn test_circle_area() {
        let spec = GeometrySpec::Circle { diameter: 20.0 };
        let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Imperial);
        assert!((area_of(extent) - 314.16).abs() < 0.01);
    }

    #[test]
    fn test_compound_is_plain_sum() {
        let spec = GeometrySpec::Compound {
            primary: Rect::new(30.0, 12.0),
            secondary: Rect::new(10.0, 8.0),
        };
        let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Imperial);
        assert!((area_of(extent) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_compound_with_empty_leg() {
        let spec = GeometrySpec::Compound {
            primary: Rect::new(30.0, 12.0),
            secondary: Rect::new(0.0, 8.0),
        };
        let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Imperial);
        assert!((area_of(extent) - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_dimension_is_zero() {
        for spec in [
            GeometrySpec::Rectangle { length: -4.0, width: 12.0 },
            GeometrySpec::Rectangle { length: 0.0, width: 12.0 },
            GeometrySpec::Circle { diameter: -1.0 },
            GeometrySpec::DirectArea { area: f64::NAN },
        ] {
            let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Imperial);
            assert!(extent.is_empty(), "{spec:?} should resolve to zero");
        }
    }

    #[test]
    fn test_direct_volume_in_gallons() {
        let spec = GeometrySpec::DirectVolume { volume: 7.480_519_480_519_48 };
        let extent = resolve(&spec, &GeometryUnits::liquid(), UnitSystem::Imperial);
        match extent {
            Extent::Volume(v) => assert!((v.0 - 1.0).abs() < 1e-9),
            Extent::Area(_) => panic!("expected a volume"),
        }
    }

    #[test]
    fn test_direct_area_metric() {
        let spec = GeometrySpec::DirectArea { area: 1.0 };
        let extent = resolve(&spec, &GeometryUnits::default(), UnitSystem::Metric);
        assert!((area_of(extent) - 10.7639).abs() < 1e-4);
    }

    #[test]
    fn test_volume_through_depth() {
        let extent = Extent::Area(SqFt(480.0));
        assert_eq!(extent.volume_through(Feet(0.25)), CuFt(120.0));
        let volume = Extent::Volume(CuFt(50.0));
        assert_eq!(volume.volume_through(Feet(3.0)), CuFt(50.0));
    }

    #[test]
    fn test_conversion_round_trip() {
        let units = GeometryUnits::default();
        let spec = GeometrySpec::Compound {
            primary: Rect::new(30.0, 12.0),
            secondary: Rect::new(10.0, 8.0),
        };
        let metric = spec.converted(&units, UnitSystem::Imperial, UnitSystem::Metric);
        let back = metric.converted(&units, UnitSystem::Metric, UnitSystem::Imperial);
        for (a, b) in spec.dimensions().iter().zip(back.dimensions()) {
            assert!((a - b).abs() < 1e-9);
        }
        // Same physical area either way
        let a_imp = area_of(resolve(&spec, &units, UnitSystem::Imperial));
        let a_met = area_of(resolve(&metric, &units, UnitSystem::Metric));
        assert!((a_imp - a_met).abs() < 1e-9);
    }

    #[test]
    fn test_unit_slots_checked() {
        assert!(GeometryUnits::default().problem().is_none());
        assert!(GeometryUnits::liquid().problem().is_none());

        let mass_as_length = GeometryUnits {
            length: UnitPair::mass(MassUnit::Pounds, MassUnit::Kilograms),
            ..GeometryUnits::default()
        };
        assert_eq!(
            mass_as_length.problem().unwrap(),
            "length units must be Length units, not Mass"
        );

        let mixed = GeometryUnits {
            area: UnitPair {
                imperial: Unit::Area(AreaUnit::SquareFeet),
                metric: Unit::Volume(VolumeUnit::Liters),
            },
            ..GeometryUnits::default()
        };
        assert!(mixed.problem().unwrap().contains("different dimensions"));
    }

    #[test]
    fn test_serialization() {
        let spec = GeometrySpec::Circle { diameter: 18.0 };
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"shape":"Circle","diameter":18.0}"#);
        let roundtrip: GeometrySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, roundtrip);
    }
}

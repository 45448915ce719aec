//! # Built-in Domains
//!
//! The estimators that ship with the engine, each one a [`DomainConfig`]
//! built from data alone.
//!
//! | Name               | Quantity         | Priced |
//! |--------------------|------------------|--------|
//! | `asphalt-paving`   | tons             | yes    |
//! | `gravel-driveway`  | tons             | yes    |
//! | `concrete-slab`    | cubic yards      | yes    |
//! | `mulch`            | cubic feet, bags | yes    |
//! | `sealcoating`      | gallons, pails   | yes    |
//! | `pool-chlorine`    | fluid ounces     | no     |
//! | `pool-stabilizer`  | ounces           | no     |
//!
//! The registry is built once on first use and never mutated.

mod landscape;
mod paving;
mod pool;

use once_cell::sync::Lazy;

use crate::config::DomainConfig;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::FieldSpec;
use crate::units::{LengthUnit, UnitPair};

static REGISTRY: Lazy<Vec<DomainConfig>> = Lazy::new(|| {
    vec![
        paving::asphalt(),
        paving::gravel(),
        paving::concrete(),
        landscape::mulch(),
        landscape::sealcoating(),
        pool::chlorine(),
        pool::stabilizer(),
    ]
});

/// Every built-in domain, in catalogue order
pub fn all() -> &'static [DomainConfig] {
    &REGISTRY
}

pub fn names() -> Vec<&'static str> {
    REGISTRY.iter().map(|d| d.name.as_str()).collect()
}

/// Look up a built-in domain by its registry name
pub fn by_name(name: &str) -> CalcResult<&'static DomainConfig> {
    REGISTRY
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| CalcError::UnknownDomain { name: name.to_string() })
}

/// A depth or thickness entered in inches / centimeters
fn inches_field(key: &str, label: &str, default: f64) -> FieldSpec {
    FieldSpec::measure(key, label, UnitPair::length(LengthUnit::Inches, LengthUnit::Centimeters), default)
}

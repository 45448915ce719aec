//! # tally_core - Parametric Estimation Engine
//!
//! `tally_core` turns a handful of user measurements into a material
//! quantity, an itemized cost and a list of advisories. One generic pipeline
//! serves every estimator; what differs between asphalt tonnage and a pool
//! chlorine dose is a [`DomainConfig`], which is plain data.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: [`engine::compute`] is a pure function of an input set and a config
//! - **JSON-First**: configs, inputs and results all implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Canonical Units**: everything is computed in feet, pounds and fluid ounces
//!
//! ## Quick Start
//!
//! ```rust
//! use tally_core::domains;
//! use tally_core::engine::compute;
//! use tally_core::geometry::GeometrySpec;
//! use tally_core::units::UnitSystem;
//!
//! let config = domains::by_name("gravel-driveway").unwrap();
//! let inputs = config
//!     .default_inputs(UnitSystem::Imperial)
//!     .with_geometry(GeometrySpec::Rectangle { length: 60.0, width: 10.0 });
//!
//! let estimate = compute(&inputs, config).unwrap();
//! let json = serde_json::to_string_pretty(&estimate).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Unit systems, conversions and type-safe unit wrappers
//! - [`geometry`] - Shapes and their canonical area or volume
//! - [`inputs`] - Field schemas and input sets
//! - [`tables`] - Fixed and choice-keyed lookup values
//! - [`quantity`] - Base quantity derivation
//! - [`adjustment`] - Ordered factor chain and cost breakdown
//! - [`advisory`] - Rule evaluation
//! - [`format`] - Rounding, display units and the result record
//! - [`config`] - Domain definitions and their validation
//! - [`engine`] - The `compute` pipeline
//! - [`session`] - Stateful wrapper for interactive front ends
//! - [`domains`] - Built-in estimators
//! - [`errors`] - Structured error types
//! - [`file_io`] - Loading configs and inputs from JSON files

pub mod adjustment;
pub mod advisory;
pub mod config;
pub mod domains;
pub mod engine;
pub mod errors;
pub mod file_io;
pub mod format;
pub mod geometry;
pub mod inputs;
pub mod quantity;
pub mod session;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use config::DomainConfig;
pub use engine::{compute, convert_unit_system, Estimate};
pub use errors::{CalcError, CalcResult};
pub use format::ResultRecord;
pub use inputs::InputSet;
pub use session::EstimatorSession;
pub use units::UnitSystem;

//! # Estimator Session
//!
//! The state a front end keeps for one open estimator: the domain, the
//! current [`InputSet`], and the last [`Estimate`].
//!
//! Every setter works on a copy of the inputs, validates it against the
//! domain schema, and only then commits and recomputes, so the held inputs
//! are never partially invalid. A setter that leaves the inputs unchanged
//! returns the memoized estimate without running the pipeline again.
//!
//! ```rust
//! use tally_core::domains;
//! use tally_core::session::EstimatorSession;
//! use tally_core::units::UnitSystem;
//!
//! let mut session = EstimatorSession::new(domains::by_name("mulch").unwrap().clone(), UnitSystem::Imperial).unwrap();
//! session.set_rectangle(20.0, 12.0).unwrap();
//! let estimate = session.set_number("depth", 3.0).unwrap();
//! assert_eq!(estimate.record().unwrap().quantity.value, 60.0);
//! ```

use crate::config::DomainConfig;
use crate::engine::{compute, convert_unit_system, Estimate};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometrySpec;
use crate::inputs::{FieldValue, InputSet};
use crate::units::UnitSystem;

#[derive(Debug, Clone)]
pub struct EstimatorSession {
    config: DomainConfig,
    inputs: InputSet,
    estimate: Estimate,
    computations: u64,
}

impl EstimatorSession {
    /// Open a session with every field at its default
    pub fn new(config: DomainConfig, system: UnitSystem) -> CalcResult<Self> {
        let inputs = config.default_inputs(system);
        Self::with_inputs(config, inputs)
    }

    /// Open a session on a previously saved input set.
    ///
    /// Both the config and the inputs are checked before the first estimate.
    pub fn with_inputs(config: DomainConfig, inputs: InputSet) -> CalcResult<Self> {
        config.validate()?;
        let estimate = compute(&inputs, &config)?;
        Ok(EstimatorSession {
            config,
            inputs,
            estimate,
            computations: 1,
        })
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    pub fn inputs(&self) -> &InputSet {
        &self.inputs
    }

    pub fn estimate(&self) -> &Estimate {
        &self.estimate
    }

    /// Number of pipeline runs so far
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Set a measured or plain numeric field. Negative values clamp to zero.
    pub fn set_number(&mut self, key: &str, value: f64) -> CalcResult<&Estimate> {
        let mut next = self.inputs.clone();
        match self.config.field(key) {
            Some(_) => next.set_number(key, value)?,
            None => return Err(CalcError::unknown_field(&self.config.name, key)),
        }
        self.commit(next)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> CalcResult<&Estimate> {
        self.set_field(key, FieldValue::Flag(value))
    }

    pub fn set_choice(&mut self, key: &str, value: &str) -> CalcResult<&Estimate> {
        self.set_field(key, FieldValue::Choice(value.to_string()))
    }

    /// Replace the shape; negative dimensions clamp to zero
    pub fn set_geometry(&mut self, geometry: GeometrySpec) -> CalcResult<&Estimate> {
        let mut next = self.inputs.clone();
        next.geometry = geometry.clamped();
        self.commit(next)
    }

    pub fn set_rectangle(&mut self, length: f64, width: f64) -> CalcResult<&Estimate> {
        self.set_geometry(GeometrySpec::Rectangle { length, width })
    }

    /// Switch unit systems, re-expressing every measurement
    pub fn set_unit_system(&mut self, system: UnitSystem) -> CalcResult<&Estimate> {
        let next = convert_unit_system(&self.inputs, system);
        self.commit(next)
    }

    fn set_field(&mut self, key: &str, value: FieldValue) -> CalcResult<&Estimate> {
        let Some(spec) = self.config.field(key) else {
            return Err(CalcError::unknown_field(&self.config.name, key));
        };
        spec.check(&value)?;
        let mut next = self.inputs.clone();
        next.fields.insert(key.to_string(), value);
        self.commit(next)
    }

    fn commit(&mut self, next: InputSet) -> CalcResult<&Estimate> {
        self.config.check_inputs(&next)?;
        if next == self.inputs {
            tracing::trace!(domain = %self.config.name, "Inputs unchanged, reusing estimate");
            return Ok(&self.estimate);
        }
        let estimate = compute(&next, &self.config)?;
        self.inputs = next;
        self.estimate = estimate;
        self.computations += 1;
        tracing::debug!(domain = %self.config.name, computations = self.computations, "Recomputed estimate");
        Ok(&self.estimate)
    }
}

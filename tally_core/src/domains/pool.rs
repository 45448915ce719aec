//! Pool chemistry: doses that raise a concentration.
//!
//! Pools are entered either as a surface with an average depth or as a known
//! volume in gallons / liters. A target at or below the current reading
//! yields a no-action result instead of a dose.

use crate::advisory::{AdvisoryCategory, AdvisoryRule, Comparison, Operand, Predicate, Severity};
use crate::config::DomainConfig;
use crate::format::DisplayRules;
use crate::geometry::GeometryUnits;
use crate::inputs::FieldSpec;
use crate::quantity::QuantityModel;
use crate::tables::Rate;
use crate::units::{LengthUnit, MassUnit, Unit, UnitPair, VolumeUnit};

const REFERENCE_GALLONS: f64 = 10_000.0;

fn depth_field() -> FieldSpec {
    FieldSpec::measure(
        "avg_depth",
        "Average depth",
        UnitPair::length(LengthUnit::Feet, LengthUnit::Meters),
        5.0,
    )
}

/// Liquid chlorine, dosed per ppm of free chlorine
pub fn chlorine() -> DomainConfig {
    DomainConfig {
        name: "pool-chlorine".to_string(),
        title: "Pool Chlorine".to_string(),
        description: "Liquid chlorine needed to reach a free-chlorine target".to_string(),
        fields: vec![
            FieldSpec::number("current_fc", "Current free chlorine", Some("ppm"), 1.0),
            FieldSpec::number("target_fc", "Target free chlorine", Some("ppm"), 3.0),
            depth_field(),
            FieldSpec::choice(
                "product",
                "Product",
                &["Liquid chlorine 12.5%", "Bleach 8.25%"],
                "Liquid chlorine 12.5%",
            ),
        ],
        geometry_units: GeometryUnits::liquid(),
        quantity: QuantityModel::Dose {
            current_field: "current_fc".to_string(),
            target_field: "target_fc".to_string(),
            depth_field: Some("avg_depth".to_string()),
            reference_gallons: REFERENCE_GALLONS,
            // fl oz per ppm per 10,000 gal
            dose_per_reference: Rate::by_choice(
                "product",
                &[("Liquid chlorine 12.5%", 10.7), ("Bleach 8.25%", 16.2)],
            ),
            unit: Unit::Volume(VolumeUnit::FluidOunces),
        },
        adjustments: vec![],
        pricing: None,
        advisories: vec![
            AdvisoryRule::new(
                "unsafe_target",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Free chlorine above 10 ppm is not safe for swimming",
                Predicate::field("target_fc", Comparison::Gt, 10.0),
            ),
            AdvisoryRule::new(
                "shock_dose",
                AdvisoryCategory::BestPractice,
                Severity::Critical,
                "Raising chlorine by more than 10 ppm is a shock treatment; keep swimmers out until it drops",
                Predicate::compare(Operand::ConcentrationDelta, Comparison::Gt, 10.0),
            ),
            AdvisoryRule::new(
                "split_dose",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Add more than a gallon of chlorine in two rounds, an hour apart",
                Predicate::compare(Operand::BaseQuantity, Comparison::Gt, 128.0),
            ),
            AdvisoryRule::new(
                "no_volume",
                AdvisoryCategory::DataQuality,
                Severity::Info,
                "Enter the pool size or volume to see a dose",
                Predicate::EmptyExtent,
            ),
        ],
        display: DisplayRules::default(),
        no_action_message: "Free chlorine is already at or above the target; no chlorine needed.".to_string(),
    }
}

/// Cyanuric acid stabilizer, dosed by weight
pub fn stabilizer() -> DomainConfig {
    DomainConfig {
        name: "pool-stabilizer".to_string(),
        title: "Pool Stabilizer".to_string(),
        description: "Cyanuric acid needed to reach a stabilizer target".to_string(),
        fields: vec![
            FieldSpec::number("current_cya", "Current stabilizer", Some("ppm"), 0.0),
            FieldSpec::number("target_cya", "Target stabilizer", Some("ppm"), 40.0),
            depth_field(),
        ],
        geometry_units: GeometryUnits::liquid(),
        quantity: QuantityModel::Dose {
            current_field: "current_cya".to_string(),
            target_field: "target_cya".to_string(),
            depth_field: Some("avg_depth".to_string()),
            reference_gallons: REFERENCE_GALLONS,
            // oz per ppm per 10,000 gal
            dose_per_reference: Rate::fixed(1.3),
            unit: Unit::Mass(MassUnit::Ounces),
        },
        adjustments: vec![],
        pricing: None,
        advisories: vec![
            AdvisoryRule::new(
                "cya_lockup",
                AdvisoryCategory::DataQuality,
                Severity::Critical,
                "Stabilizer above 100 ppm locks up chlorine and only draining brings it down",
                Predicate::field("target_cya", Comparison::Gt, 100.0),
            ),
            AdvisoryRule::new(
                "cya_high",
                AdvisoryCategory::BestPractice,
                Severity::Warning,
                "Keep stabilizer between 30 and 50 ppm for an outdoor pool",
                Predicate::All {
                    of: vec![
                        Predicate::field("target_cya", Comparison::Gt, 50.0),
                        Predicate::field("target_cya", Comparison::Le, 100.0),
                    ],
                },
            ),
            AdvisoryRule::new(
                "no_volume",
                AdvisoryCategory::DataQuality,
                Severity::Info,
                "Enter the pool size or volume to see a dose",
                Predicate::EmptyExtent,
            ),
        ],
        display: DisplayRules::default(),
        no_action_message: "Stabilizer is already at or above the target; none needed.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute, convert_unit_system, Estimate};
    use crate::geometry::GeometrySpec;
    use crate::units::UnitSystem;

    fn volume(config: &DomainConfig, gallons: f64) -> crate::inputs::InputSet {
        config
            .default_inputs(UnitSystem::Imperial)
            .with_geometry(GeometrySpec::DirectVolume { volume: gallons })
    }

    #[test]
    fn test_chlorine_dose_for_known_volume() {
        let config = chlorine();
        let estimate = compute(&volume(&config, 10_000.0), &config).unwrap();
        let record = estimate.record().unwrap();
        assert_eq!(record.quantity.value, 21.4);
        assert_eq!(record.quantity.symbol, "fl oz");
        assert!(record.secondary.is_none());
        assert!(record.advisories.is_empty());
    }

    #[test]
    fn test_chlorine_dose_from_surface_and_depth() {
        let config = chlorine();
        let inputs = config
            .default_inputs(UnitSystem::Imperial)
            .with_geometry(GeometrySpec::Rectangle { length: 32.0, width: 16.0 });
        let record = compute(&inputs, &config).unwrap().record().cloned().unwrap();
        // 2560 ft³ ≈ 19,150 gal
        let water = record.details.iter().find(|d| d.label == "Water volume").unwrap();
        assert!((water.measurement.value - 19_150.0).abs() < 1.0);
        assert_eq!(record.quantity.value, 41.0);
    }

    #[test]
    fn test_chlorine_metric_milliliters() {
        let config = chlorine();
        let metric = convert_unit_system(&volume(&config, 10_000.0), UnitSystem::Metric);
        let record = compute(&metric, &config).unwrap().record().cloned().unwrap();
        assert_eq!(record.quantity.symbol, "mL");
        assert!((record.quantity.value - 632.9).abs() < 0.06);
    }

    #[test]
    fn test_no_action_still_reports_advisories() {
        let config = chlorine();
        let inputs = volume(&config, 15_000.0)
            .with_number("current_fc", 12.0).unwrap()
            .with_number("target_fc", 11.0).unwrap();
        match compute(&inputs, &config).unwrap() {
            Estimate::NoActionNeeded(record) => {
                assert_eq!(record.advisories.len(), 1);
                assert_eq!(record.advisories[0].rule_id, "unsafe_target");
            }
            Estimate::Ready(_) => panic!("target below current must not produce a dose"),
        }
    }

    #[test]
    fn test_equal_levels_need_nothing() {
        let config = chlorine();
        let inputs = volume(&config, 15_000.0)
            .with_number("current_fc", 3.0).unwrap()
            .with_number("target_fc", 3.0).unwrap();
        assert!(matches!(compute(&inputs, &config).unwrap(), Estimate::NoActionNeeded(_)));
    }

    #[test]
    fn test_shock_dose_is_critical() {
        let config = chlorine();
        let inputs = volume(&config, 20_000.0).with_number("target_fc", 15.0).unwrap();
        let estimate = compute(&inputs, &config).unwrap();
        let severities: Vec<Severity> = estimate.advisories().iter().map(|a| a.severity).collect();
        assert_eq!(severities, [Severity::Warning, Severity::Critical, Severity::Info]);
    }

    #[test]
    fn test_stabilizer_promotes_to_pounds() {
        let config = stabilizer();
        let record = compute(&volume(&config, 10_000.0), &config)
            .unwrap()
            .record()
            .cloned()
            .unwrap();
        assert_eq!(record.quantity.value, 52.0);
        assert_eq!(record.quantity.symbol, "oz");
        let secondary = record.secondary.unwrap();
        assert_eq!(secondary.symbol, "lb");
        assert_eq!(secondary.value, 3.25);
    }

    #[test]
    fn test_stabilizer_metric_promotes_to_kilograms() {
        let config = stabilizer();
        let metric = convert_unit_system(&volume(&config, 10_000.0), UnitSystem::Metric);
        let record = compute(&metric, &config).unwrap().record().cloned().unwrap();
        assert_eq!(record.quantity.symbol, "g");
        let secondary = record.secondary.unwrap();
        assert_eq!(secondary.symbol, "kg");
        assert!((secondary.value - 1.47).abs() < 0.006);
    }

    #[test]
    fn test_stabilizer_lockup_is_critical() {
        let config = stabilizer();
        let estimate = compute(&volume(&config, 10_000.0).with_number("target_cya", 120.0).unwrap(), &config).unwrap();
        let advisories = estimate.advisories();
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].severity, Severity::Critical);
    }
}

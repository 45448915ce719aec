//! Surface materials sold in packages: mulch bags, sealer pails.

use crate::adjustment::{AdjustmentFactor, FactorSource, FactorTarget, LineItemSpec, LineRole, PriceBasis, PricingModel};
use crate::advisory::{AdvisoryCategory, AdvisoryRule, Comparison, Operand, Predicate, Severity};
use crate::config::DomainConfig;
use crate::format::{DisplayRules, Packaging};
use crate::geometry::GeometryUnits;
use crate::inputs::FieldSpec;
use crate::quantity::QuantityModel;
use crate::tables::Rate;
use crate::units::{Unit, VolumeUnit};

use super::inches_field;

pub fn mulch() -> DomainConfig {
    DomainConfig {
        name: "mulch".to_string(),
        title: "Mulch".to_string(),
        description: "Cubic feet and bag count for a planting bed".to_string(),
        fields: vec![
            inches_field("depth", "Depth", 3.0),
            FieldSpec::choice("mulch_type", "Mulch", &["Hardwood", "Pine bark", "Rubber"], "Hardwood"),
            FieldSpec::flag("top_up", "Topping up an existing bed", false),
            FieldSpec::flag("delivery", "Bulk delivery", false),
        ],
        geometry_units: GeometryUnits::default(),
        quantity: QuantityModel::FillVolume {
            depth_field: "depth".to_string(),
            unit: VolumeUnit::CubicFeet,
        },
        adjustments: vec![AdjustmentFactor::multiplier(
            "top_up",
            "Existing mulch",
            FactorTarget::Quantity,
            FactorSource::Flag {
                field: "top_up".to_string(),
                on: 0.5,
                off: 1.0,
            },
        )],
        pricing: Some(PricingModel::new(vec![
            LineItemSpec::new(
                "material",
                "Mulch",
                LineRole::Material,
                PriceBasis::PerQuantity,
                Rate::by_choice("mulch_type", &[("Hardwood", 2.25), ("Pine bark", 2.5), ("Rubber", 4.5)]),
            ),
            LineItemSpec::new("delivery", "Delivery", LineRole::Delivery, PriceBasis::Flat, Rate::fixed(60.0))
                .when("delivery"),
        ])),
        advisories: vec![
            AdvisoryRule::new(
                "too_deep",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Mulch deeper than 4 in starves roots of air",
                Predicate::field("depth", Comparison::Gt, 4.0),
            ),
            AdvisoryRule::new(
                "too_thin",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Less than 2 in of mulch will not keep weeds down",
                Predicate::field("depth", Comparison::Lt, 2.0),
            ),
            AdvisoryRule::new(
                "order_bulk",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Over 100 ft³ is usually cheaper as a bulk delivery",
                Predicate::All {
                    of: vec![
                        Predicate::compare(Operand::AdjustedQuantity, Comparison::Gt, 100.0),
                        Predicate::Not {
                            predicate: Box::new(Predicate::flag_set("delivery")),
                        },
                    ],
                },
            ),
            AdvisoryRule::new(
                "no_area",
                AdvisoryCategory::DataQuality,
                Severity::Info,
                "Enter the bed size to see how much mulch to buy",
                Predicate::EmptyExtent,
            ),
        ],
        display: DisplayRules {
            packaging: Some(Packaging {
                size: 2.0,
                label: "bags".to_string(),
            }),
            ..DisplayRules::default()
        },
        no_action_message: String::new(),
    }
}

/// Driveway sealer applied in coats, sold in 5 gal pails
pub fn sealcoating() -> DomainConfig {
    DomainConfig {
        name: "sealcoating".to_string(),
        title: "Sealcoating".to_string(),
        description: "Sealer gallons and pail count for an asphalt surface".to_string(),
        fields: vec![
            FieldSpec::number("coats", "Coats", None, 2.0),
            FieldSpec::choice("sealer", "Sealer", &["Asphalt emulsion", "Coal tar", "Acrylic"], "Asphalt emulsion"),
            FieldSpec::choice("surface", "Surface condition", &["Smooth", "Average", "Porous"], "Average"),
            FieldSpec::number("labor_rate", "Labor rate", Some("$/ft²"), 0.12),
        ],
        geometry_units: GeometryUnits::default(),
        quantity: QuantityModel::Coverage {
            coats_field: Some("coats".to_string()),
            coverage_sqft_per_unit: Rate::by_choice(
                "sealer",
                &[("Asphalt emulsion", 80.0), ("Coal tar", 80.0), ("Acrylic", 100.0)],
            ),
            unit: Unit::Volume(VolumeUnit::Gallons),
        },
        adjustments: vec![AdjustmentFactor::multiplier(
            "surface",
            "Surface absorption",
            FactorTarget::Quantity,
            FactorSource::Choice {
                field: "surface".to_string(),
                table: [("Smooth", 1.0), ("Average", 1.1), ("Porous", 1.25)]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            },
        )],
        pricing: Some(PricingModel::new(vec![
            LineItemSpec::new(
                "material",
                "Sealer",
                LineRole::Material,
                PriceBasis::PerQuantity,
                Rate::by_choice("sealer", &[("Asphalt emulsion", 4.0), ("Coal tar", 3.5), ("Acrylic", 9.0)]),
            ),
            LineItemSpec::new(
                "labor",
                "Application",
                LineRole::Labor,
                PriceBasis::PerArea,
                Rate::FromField { field: "labor_rate".to_string() },
            ),
        ])),
        advisories: vec![
            AdvisoryRule::new(
                "no_coats",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Apply at least one full coat",
                Predicate::field("coats", Comparison::Lt, 1.0),
            ),
            AdvisoryRule::new(
                "many_coats",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "More than 3 coats adds cost without adding protection",
                Predicate::field("coats", Comparison::Gt, 3.0),
            ),
            AdvisoryRule::new(
                "coal_tar",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Coal-tar sealers are restricted in several states; check before buying",
                Predicate::choice_is("sealer", "Coal tar"),
            ),
            AdvisoryRule::new(
                "no_area",
                AdvisoryCategory::DataQuality,
                Severity::Info,
                "Enter the surface size to see how much sealer to buy",
                Predicate::EmptyExtent,
            ),
        ],
        display: DisplayRules {
            packaging: Some(Packaging {
                size: 5.0,
                label: "pails".to_string(),
            }),
            ..DisplayRules::default()
        },
        no_action_message: String::new(),
    }
}

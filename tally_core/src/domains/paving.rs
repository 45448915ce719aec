//! Paving and hardscape fills: asphalt, gravel, concrete.

use crate::adjustment::{
    AdjustmentFactor, FactorSource, FactorTarget, LineItemSpec, LineRole, PriceBasis, PricingModel, Tier, TierBasis,
};
use crate::advisory::{AdvisoryCategory, AdvisoryRule, Comparison, Operand, Predicate, Severity};
use crate::config::DomainConfig;
use crate::format::DisplayRules;
use crate::geometry::GeometryUnits;
use crate::inputs::FieldSpec;
use crate::quantity::QuantityModel;
use crate::tables::Rate;
use crate::units::{MassUnit, VolumeUnit};

use super::inches_field;

const REGIONS: [&str; 4] = ["Northeast", "Midwest", "South", "West"];

fn choice_factor(key: &str, label: &str, target: FactorTarget, field: &str, entries: &[(&str, f64)]) -> AdjustmentFactor {
    AdjustmentFactor::multiplier(
        key,
        label,
        target,
        FactorSource::Choice {
            field: field.to_string(),
            table: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        },
    )
}

fn empty_extent_rule(message: &str) -> AdvisoryRule {
    AdvisoryRule::new(
        "no_area",
        AdvisoryCategory::DataQuality,
        Severity::Info,
        message,
        Predicate::EmptyExtent,
    )
}

/// Hot-mix asphalt sold by the ton.
///
/// Cost runs region → season → material → project type → size discount.
/// The labor input is quoted per 10 ft² and divided down before pricing.
pub fn asphalt() -> DomainConfig {
    DomainConfig {
        name: "asphalt-paving".to_string(),
        title: "Asphalt Paving".to_string(),
        description: "Tonnage and installed cost for an asphalt driveway or lot".to_string(),
        fields: vec![
            inches_field("thickness", "Compacted thickness", 3.0),
            FieldSpec::choice("region", "Region", &REGIONS, "Midwest"),
            FieldSpec::choice("season", "Season", &["Spring", "Summer", "Fall", "Winter"], "Summer"),
            FieldSpec::choice("material", "Mix", &["Hot mix", "Warm mix", "Recycled mix"], "Hot mix"),
            FieldSpec::choice("project_type", "Project type", &["Residential", "Commercial"], "Residential"),
            FieldSpec::number("price_per_ton", "Asphalt price", Some("$/ton"), 95.0),
            FieldSpec::number("labor_rate", "Labor rate", Some("$ per 10 ft²"), 25.0),
            FieldSpec::flag("permit", "Permit required", false),
            FieldSpec::flag("haul_away", "Remove old pavement", false),
            FieldSpec::flag("recycled_base", "Recycle millings", false),
        ],
        geometry_units: GeometryUnits::default(),
        quantity: QuantityModel::FillMass {
            depth_field: "thickness".to_string(),
            density: Rate::by_choice("material", &[("Hot mix", 145.0), ("Warm mix", 145.0), ("Recycled mix", 140.0)]),
            unit: MassUnit::ShortTons,
        },
        adjustments: vec![
            choice_factor(
                "region",
                "Regional pricing",
                FactorTarget::Cost,
                "region",
                &[("Northeast", 1.15), ("Midwest", 1.0), ("South", 0.92), ("West", 1.1)],
            ),
            choice_factor(
                "season",
                "Seasonal pricing",
                FactorTarget::Cost,
                "season",
                &[("Spring", 1.05), ("Summer", 1.0), ("Fall", 1.0), ("Winter", 1.2)],
            ),
            choice_factor(
                "material",
                "Mix premium",
                FactorTarget::Cost,
                "material",
                &[("Hot mix", 1.0), ("Warm mix", 1.05), ("Recycled mix", 0.85)],
            ),
            choice_factor(
                "project_type",
                "Commercial labor",
                FactorTarget::Line("labor".to_string()),
                "project_type",
                &[("Residential", 1.0), ("Commercial", 1.25)],
            ),
            AdjustmentFactor::multiplier(
                "size_discount",
                "Size discount",
                FactorTarget::Cost,
                FactorSource::Tiered {
                    basis: TierBasis::Area,
                    tiers: vec![Tier { min: 2_500.0, value: 0.95 }, Tier { min: 10_000.0, value: 0.9 }],
                    below: 1.0,
                },
            ),
        ],
        pricing: Some(PricingModel {
            line_items: vec![
                LineItemSpec::new(
                    "material",
                    "Asphalt",
                    LineRole::Material,
                    PriceBasis::PerQuantity,
                    Rate::FromField { field: "price_per_ton".to_string() },
                ),
                LineItemSpec::new(
                    "labor",
                    "Installation",
                    LineRole::Labor,
                    PriceBasis::PerArea,
                    Rate::FromField { field: "labor_rate".to_string() },
                ),
                LineItemSpec::new("delivery", "Trucking", LineRole::Delivery, PriceBasis::Flat, Rate::fixed(250.0)),
                LineItemSpec::new("permit", "Permit", LineRole::Fee, PriceBasis::Flat, Rate::fixed(150.0)).when("permit"),
                LineItemSpec::new("disposal", "Disposal", LineRole::Fee, PriceBasis::PerArea, Rate::fixed(0.35))
                    .when("haul_away"),
                LineItemSpec::new(
                    "recycling_credit",
                    "Recycling credit",
                    LineRole::Credit,
                    PriceBasis::PerQuantity,
                    Rate::fixed(8.0),
                )
                .when("recycled_base"),
            ],
            labor_rate_divisor: 10.0,
            currency_decimals: 0,
        }),
        advisories: vec![
            AdvisoryRule::new(
                "min_thickness",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Thickness is below the 2 in minimum thickness for a paved surface",
                Predicate::field("thickness", Comparison::Lt, 2.0),
            ),
            AdvisoryRule::new(
                "commercial_thickness",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Commercial lots carrying trucks need at least 3 in of asphalt",
                Predicate::All {
                    of: vec![
                        Predicate::choice_is("project_type", "Commercial"),
                        Predicate::field("thickness", Comparison::Lt, 3.0),
                    ],
                },
            ),
            AdvisoryRule::new(
                "two_lifts",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Lay more than 4 in of asphalt in two lifts for proper compaction",
                Predicate::field("thickness", Comparison::Gt, 4.0),
            ),
            AdvisoryRule::new(
                "commercial_scale",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Area exceeds 10,000 ft²; get a commercial quote",
                Predicate::All {
                    of: vec![
                        Predicate::compare(Operand::Area, Comparison::Gt, 10_000.0),
                        Predicate::choice_is("project_type", "Residential"),
                    ],
                },
            ),
            AdvisoryRule::new(
                "winter_paving",
                AdvisoryCategory::BestPractice,
                Severity::Warning,
                "Asphalt laid below 50°F cools before it compacts",
                Predicate::choice_is("season", "Winter"),
            ),
            empty_extent_rule("Enter the paved area to see tonnage and cost"),
        ],
        display: DisplayRules::default(),
        no_action_message: String::new(),
    }
}

/// Crushed stone or pea gravel over a compacted base
pub fn gravel() -> DomainConfig {
    DomainConfig {
        name: "gravel-driveway".to_string(),
        title: "Gravel Driveway".to_string(),
        description: "Stone tonnage for a gravel driveway or path".to_string(),
        fields: vec![
            inches_field("depth", "Depth", 4.0),
            FieldSpec::choice("stone", "Stone", &["Crushed stone", "Pea gravel", "River rock"], "Crushed stone"),
            FieldSpec::number("price_per_ton", "Stone price", Some("$/ton"), 45.0),
            FieldSpec::flag("delivery", "Delivery", true),
        ],
        geometry_units: GeometryUnits::default(),
        quantity: QuantityModel::FillMass {
            depth_field: "depth".to_string(),
            density: Rate::by_choice(
                "stone",
                &[("Crushed stone", 100.0), ("Pea gravel", 95.0), ("River rock", 100.0)],
            ),
            unit: MassUnit::ShortTons,
        },
        adjustments: vec![AdjustmentFactor::multiplier(
            "compaction",
            "Compaction allowance",
            FactorTarget::Quantity,
            FactorSource::Constant { value: 1.15 },
        )],
        pricing: Some(PricingModel::new(vec![
            LineItemSpec::new(
                "material",
                "Stone",
                LineRole::Material,
                PriceBasis::PerQuantity,
                Rate::FromField { field: "price_per_ton".to_string() },
            ),
            LineItemSpec::new("delivery", "Delivery", LineRole::Delivery, PriceBasis::Flat, Rate::fixed(120.0))
                .when("delivery"),
        ])),
        advisories: vec![
            AdvisoryRule::new(
                "shallow",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Driveways need at least 4 in of gravel to carry vehicles",
                Predicate::field("depth", Comparison::Lt, 4.0),
            ),
            AdvisoryRule::new(
                "layers",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Build gravel deeper than 8 in in compacted layers",
                Predicate::field("depth", Comparison::Gt, 8.0),
            ),
            AdvisoryRule::new(
                "pea_gravel_driveway",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Pea gravel rolls under tires; crushed stone locks together better",
                Predicate::choice_is("stone", "Pea gravel"),
            ),
            empty_extent_rule("Enter the driveway size to see tonnage"),
        ],
        display: DisplayRules::default(),
        no_action_message: String::new(),
    }
}

/// Ready-mix concrete ordered by the cubic yard
pub fn concrete() -> DomainConfig {
    DomainConfig {
        name: "concrete-slab".to_string(),
        title: "Concrete Slab".to_string(),
        description: "Ready-mix volume and cost for a slab or patio".to_string(),
        fields: vec![
            inches_field("thickness", "Slab thickness", 4.0),
            FieldSpec::choice("reinforcement", "Reinforcement", &["None", "Wire mesh", "Rebar"], "Wire mesh"),
            FieldSpec::number("price_per_yard", "Concrete price", Some("$/yd³"), 150.0),
            FieldSpec::flag("pump", "Pump truck", false),
        ],
        geometry_units: GeometryUnits::default(),
        quantity: QuantityModel::FillVolume {
            depth_field: "thickness".to_string(),
            unit: VolumeUnit::CubicYards,
        },
        adjustments: vec![AdjustmentFactor::multiplier(
            "waste",
            "Spillage and over-excavation",
            FactorTarget::Quantity,
            FactorSource::Constant { value: 1.1 },
        )],
        pricing: Some(PricingModel::new(vec![
            LineItemSpec::new(
                "material",
                "Ready-mix",
                LineRole::Material,
                PriceBasis::PerQuantity,
                Rate::FromField { field: "price_per_yard".to_string() },
            ),
            LineItemSpec::new(
                "reinforcement",
                "Reinforcement",
                LineRole::Material,
                PriceBasis::PerArea,
                Rate::by_choice("reinforcement", &[("None", 0.0), ("Wire mesh", 0.25), ("Rebar", 0.55)]),
            ),
            LineItemSpec::new("pump", "Pump truck", LineRole::Fee, PriceBasis::Flat, Rate::fixed(175.0)).when("pump"),
        ])),
        advisories: vec![
            AdvisoryRule::new(
                "thin_slab",
                AdvisoryCategory::DataQuality,
                Severity::Warning,
                "Slabs under 4 in thick crack under load",
                Predicate::field("thickness", Comparison::Lt, 4.0),
            ),
            AdvisoryRule::new(
                "unreinforced",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Unreinforced slabs over 5 in should carry rebar",
                Predicate::All {
                    of: vec![
                        Predicate::choice_is("reinforcement", "None"),
                        Predicate::field("thickness", Comparison::Gt, 5.0),
                    ],
                },
            ),
            AdvisoryRule::new(
                "short_load",
                AdvisoryCategory::BestPractice,
                Severity::Info,
                "Orders under 1 yd³ are usually cheaper as bagged mix",
                Predicate::compare(Operand::AdjustedQuantity, Comparison::Lt, 1.0),
            ),
            empty_extent_rule("Enter the slab size to see the pour volume"),
        ],
        display: DisplayRules::default(),
        no_action_message: String::new(),
    }
}

//! Plain-text rendering of schemas and results.

use tally_core::engine::NoActionRecord;
use tally_core::format::ResultRecord;
use tally_core::inputs::{FieldKind, FieldSpec};
use tally_core::units::{PhysicalUnit, UnitSystem};
use tally_core::DomainConfig;

const RULE: &str = "═══════════════════════════════════════";

fn banner(title: &str) {
    println!("{RULE}");
    println!("  {title}");
    println!("{RULE}");
}

fn describe_field(field: &FieldSpec) -> String {
    match &field.kind {
        FieldKind::Measure { units, default } => format!(
            "{default} {} (metric: {})",
            units.for_system(UnitSystem::Imperial).symbol(),
            units.for_system(UnitSystem::Metric).symbol()
        ),
        FieldKind::Number { default, unit_label } => match unit_label {
            Some(label) => format!("{default} {label}"),
            None => default.to_string(),
        },
        FieldKind::Flag { default } => if *default { "yes" } else { "no" }.to_string(),
        FieldKind::Choice { options, default } => format!("{default}  [{}]", options.join(" | ")),
    }
}

pub fn print_schema(config: &DomainConfig) {
    banner(&format!("{} ({})", config.title.to_uppercase(), config.name));
    if !config.description.is_empty() {
        println!("{}", config.description);
    }
    println!();
    println!("Fields (default):");
    for field in &config.fields {
        println!("  {:<16} {:<28} {}", field.key, field.label, describe_field(field));
    }
    if !config.adjustments.is_empty() {
        println!();
        println!("Adjustments, in order:");
        for factor in &config.adjustments {
            println!("  {:<16} {}", factor.key, factor.label);
        }
    }
}

pub fn print_record(config: &DomainConfig, record: &ResultRecord) {
    banner(&format!("{} ESTIMATE", config.title.to_uppercase()));
    println!();
    println!("Extent:    {}", record.extent);
    for detail in &record.details {
        println!("{:<10} {}", format!("{}:", detail.label), detail.measurement);
    }
    println!("Base:      {}", record.base_quantity);
    match &record.secondary {
        Some(secondary) => println!("Quantity:  {} ({})", record.quantity, secondary),
        None => println!("Quantity:  {}", record.quantity),
    }
    if let Some(packages) = &record.packages {
        println!("Buy:       {} {}", packages.count, packages.label);
    }

    if !record.factors.is_empty() {
        println!();
        println!("Factors:");
        for factor in &record.factors {
            println!("  {:<28} {}", factor.label, factor.value);
        }
    }

    if let Some(cost) = &record.cost {
        let decimals = cost.decimals as usize;
        println!();
        println!("Cost:");
        for line in &cost.lines {
            println!("  {:<28} {:>12.*}", line.label, decimals, line.amount);
        }
        println!("  {:<28} {:>12.*}", "TOTAL", decimals, cost.total);
    }

    print_advisories(&record.advisories);
    println!("{RULE}");
}

pub fn print_no_action(config: &DomainConfig, record: &NoActionRecord) {
    banner(&format!("{} ESTIMATE", config.title.to_uppercase()));
    println!();
    println!("{}", record.message);
    println!("  current {}, target {}", record.current, record.target);
    print_advisories(&record.advisories);
    println!("{RULE}");
}

fn print_advisories(advisories: &[tally_core::advisory::Advisory]) {
    if advisories.is_empty() {
        return;
    }
    println!();
    println!("Advisories:");
    for advisory in advisories {
        println!("  [{}] {}", advisory.severity, advisory.message);
    }
}

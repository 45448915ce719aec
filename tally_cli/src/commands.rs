//! Subcommand implementations.

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use tally_core::domains;
use tally_core::file_io::{load_domain_config, load_inputs};
use tally_core::geometry::{GeometrySpec, Rect};
use tally_core::inputs::FieldKind;
use tally_core::{DomainConfig, Estimate, EstimatorSession, UnitSystem};

use crate::cli::{DomainArgs, EstimateArgs, ShapeArgs, ShowArgs};
use crate::report;

pub fn run_list() -> Result<()> {
    println!("Built-in domains");
    println!("================");
    for domain in domains::all() {
        println!("  {:<18} {}", domain.name, domain.title);
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let config = resolve_domain(&args.domain)?;
    if args.json {
        println!("{}", config.to_json()?);
    } else {
        report::print_schema(&config);
    }
    Ok(())
}

pub fn run_estimate(args: &EstimateArgs) -> Result<()> {
    let config = resolve_domain(&args.domain)?;
    let system = if args.metric { UnitSystem::Metric } else { UnitSystem::Imperial };

    let mut session = match &args.inputs {
        Some(path) => {
            let inputs = load_inputs(path, &config).with_context(|| format!("load inputs from {}", path.display()))?;
            let mut session = EstimatorSession::with_inputs(config, inputs)?;
            session.set_unit_system(system)?;
            session
        }
        None => EstimatorSession::new(config, system)?,
    };

    if let Some(shape) = shape_from_args(&args.shape) {
        session.set_geometry(shape)?;
    }
    for (key, value) in &args.set {
        apply_assignment(&mut session, key, value).with_context(|| format!("--set {key}={value}"))?;
    }
    info!(computations = session.computations(), "Estimate ready");

    let estimate = session.estimate();
    if args.json {
        println!("{}", serde_json::to_string_pretty(estimate)?);
    } else {
        match estimate {
            Estimate::Ready(record) => report::print_record(session.config(), record),
            Estimate::NoActionNeeded(record) => report::print_no_action(session.config(), record),
        }
    }
    Ok(())
}

fn resolve_domain(args: &DomainArgs) -> Result<DomainConfig> {
    match (&args.config, &args.domain) {
        (Some(path), _) => {
            load_domain_config(path).with_context(|| format!("load domain from {}", path.display()))
        }
        (None, Some(name)) => domains::by_name(name).cloned().map_err(|e| {
            anyhow!("{e}. Available: {}", domains::names().join(", "))
        }),
        (None, None) => bail!("name a domain or pass --config"),
    }
}

fn shape_from_args(args: &ShapeArgs) -> Option<GeometrySpec> {
    match args {
        ShapeArgs {
            length: Some(length),
            width: Some(width),
            length2: Some(length2),
            width2: Some(width2),
            ..
        } => Some(GeometrySpec::Compound {
            primary: Rect::new(*length, *width),
            secondary: Rect::new(*length2, *width2),
        }),
        ShapeArgs {
            length: Some(length),
            width: Some(width),
            ..
        } => Some(GeometrySpec::Rectangle {
            length: *length,
            width: *width,
        }),
        ShapeArgs {
            diameter: Some(diameter), ..
        } => Some(GeometrySpec::Circle { diameter: *diameter }),
        ShapeArgs { area: Some(area), .. } => Some(GeometrySpec::DirectArea { area: *area }),
        ShapeArgs { volume: Some(volume), .. } => Some(GeometrySpec::DirectVolume { volume: *volume }),
        _ => None,
    }
}

/// Parse a `--set` value by the declared kind of its field
fn apply_assignment(session: &mut EstimatorSession, key: &str, raw: &str) -> Result<()> {
    let kind = session
        .config()
        .field(key)
        .map(|f| f.kind.clone())
        .ok_or_else(|| anyhow!("unknown field '{key}' for domain '{}'", session.config().name))?;
    match kind {
        FieldKind::Measure { .. } | FieldKind::Number { .. } => {
            let value: f64 = raw.parse().with_context(|| format!("'{raw}' is not a number"))?;
            session.set_number(key, value)?;
        }
        FieldKind::Flag { .. } => {
            let value = match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => bail!("'{raw}' is not a yes/no value"),
            };
            session.set_flag(key, value)?;
        }
        FieldKind::Choice { .. } => {
            session.set_choice(key, raw)?;
        }
    }
    Ok(())
}

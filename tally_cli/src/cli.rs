//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Tally - material quantity and cost estimator",
    long_about = "Estimate material quantities, costs and advisories for paving, \
                  landscaping and pool chemistry jobs.\n\n\
                  Use a built-in domain by name or load a domain definition from JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the built-in domains.
    List,

    /// Show a domain's fields and defaults.
    Show(ShowArgs),

    /// Compute an estimate.
    Estimate(EstimateArgs),
}

/// Which domain to use: a built-in name or a JSON definition.
#[derive(Args)]
pub struct DomainArgs {
    /// Built-in domain name (see `tally list`).
    #[arg(value_name = "DOMAIN", required_unless_present = "config")]
    pub domain: Option<String>,

    /// Load the domain definition from a JSON file instead.
    #[arg(long = "config", value_name = "PATH", conflicts_with = "domain")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Print the full domain definition as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Start from a saved input set (JSON) instead of the defaults.
    #[arg(long = "inputs", value_name = "PATH")]
    pub inputs: Option<PathBuf>,

    #[command(flatten)]
    pub shape: ShapeArgs,

    /// Override a field, e.g. `--set thickness=2.5 --set region=South`.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Enter and display values in metric units.
    #[arg(long = "metric")]
    pub metric: bool,

    /// Print the estimate as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// Shape dimensions, in the active unit system's display units.
#[derive(Args, Default)]
pub struct ShapeArgs {
    /// Rectangle length.
    #[arg(long = "length", requires = "width", conflicts_with_all = ["diameter", "area", "volume"])]
    pub length: Option<f64>,

    /// Rectangle width.
    #[arg(long = "width", requires = "length")]
    pub width: Option<f64>,

    /// Length of a second rectangle added to the first (L-shapes).
    #[arg(long = "length2", requires_all = ["width2", "length"])]
    pub length2: Option<f64>,

    /// Width of the second rectangle.
    #[arg(long = "width2", requires = "length2")]
    pub width2: Option<f64>,

    /// Circle diameter.
    #[arg(long = "diameter", conflicts_with_all = ["area", "volume"])]
    pub diameter: Option<f64>,

    /// Known area.
    #[arg(long = "area", conflicts_with = "volume")]
    pub area: Option<f64>,

    /// Known volume.
    #[arg(long = "volume")]
    pub volume: Option<f64>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("region = South").unwrap(),
            ("region".to_string(), "South".to_string())
        );
        assert!(parse_assignment("=3").is_err());
        assert!(parse_assignment("thickness").is_err());
    }

    #[test]
    fn test_estimate_args() {
        let cli = Cli::try_parse_from([
            "tally", "estimate", "asphalt-paving", "--length", "40", "--width", "12", "--set", "thickness=3", "--json",
        ])
        .unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.domain.domain.as_deref(), Some("asphalt-paving"));
        assert_eq!(args.shape.length, Some(40.0));
        assert_eq!(args.set, [("thickness".to_string(), "3".to_string())]);
        assert!(args.json);
    }

    #[test]
    fn test_conflicting_shapes_rejected() {
        let result = Cli::try_parse_from(["tally", "estimate", "mulch", "--diameter", "10", "--area", "100"]);
        assert!(result.is_err());
    }
}

use std::{fs, path::PathBuf, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};

use supply_pnml::{
    conversion::normalize::NormalizePolicy, convert_path, export_petri_net_to_pnml_string,
    ConversionOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// PNML document for Petri net editors
    Pnml,
    /// JSON dump of the net
    Json,
}

/// Convert a supply-chain workbook into a laid-out PNML Petri net
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workbook (.xlsx, .xls, .xlsb, .ods) or directory with nodes.csv, edges.csv, demands.csv
    #[arg(required_unless_present = "print_default_config")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "input_woped.pnml")]
    output: PathBuf,

    /// JSON file with conversion options (missing fields keep their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pnml)]
    format: OutputFormat,

    /// Print the default conversion options as JSON and exit
    #[arg(long)]
    print_default_config: bool,

    /// Hash ids of labels without any ASCII letter or digit (default)
    #[arg(long, conflicts_with = "legacy_ids")]
    strict_ids: bool,

    /// Replace non-ASCII characters by underscores even if the id becomes ambiguous
    #[arg(long)]
    legacy_ids: bool,

    /// Guess missing or unknown tiers from warehouse names
    #[arg(long)]
    infer_tiers: bool,
}

fn load_options(cli: &Cli) -> anyhow::Result<ConversionOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ConversionOptions::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ConversionOptions::default(),
    };
    if cli.strict_ids {
        options.normalize = NormalizePolicy::Strict;
    }
    if cli.legacy_ids {
        options.normalize = NormalizePolicy::Legacy;
    }
    if cli.infer_tiers {
        options.infer_tier_from_name = true;
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(
        env_logger::Env::new()
            .filter_or("SPNML_LOG", "warn")
            .write_style("SPNML_LOG_STYLE"),
    );
    let cli = Cli::parse();

    if cli.print_default_config {
        println!("{}", ConversionOptions::default().to_json()?);
        return Ok(());
    }
    let Some(input) = &cli.input else {
        anyhow::bail!("no input given");
    };
    let options = load_options(&cli)?;

    let now = Instant::now();
    let conversion = convert_path(input, &options)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    let net = &conversion.net;
    let rendered = match cli.format {
        OutputFormat::Pnml => export_petri_net_to_pnml_string(net, &options.pnml)?,
        OutputFormat::Json => net.to_json()?,
    };
    fs::write(&cli.output, rendered)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    log::info!("converted in {:#?}", now.elapsed());

    println!(
        "Wrote {} places, {} transitions, {} arcs to {} ({} warnings)",
        net.places.len(),
        net.transitions.len(),
        net.arcs.len(),
        cli.output.display(),
        conversion.diagnostics.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["spnml", "input.xlsx"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("input_woped.pnml"));
        assert_eq!(cli.format, OutputFormat::Pnml);
        assert_eq!(load_options(&cli).unwrap(), ConversionOptions::default());
    }

    #[test]
    fn id_policy_flags() {
        let cli = Cli::try_parse_from(["spnml", "in", "--legacy-ids", "--infer-tiers"]).unwrap();
        let options = load_options(&cli).unwrap();
        assert_eq!(options.normalize, NormalizePolicy::Legacy);
        assert!(options.infer_tier_from_name);
        assert!(Cli::try_parse_from(["spnml", "in", "--legacy-ids", "--strict-ids"]).is_err());
    }

    #[test]
    fn input_required_unless_printing_config() {
        assert!(Cli::try_parse_from(["spnml"]).is_err());
        assert!(Cli::try_parse_from(["spnml", "--print-default-config"]).is_ok());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

//! `ipog`: generate a covering array from the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ipog_core::verify::first_uncovered_tuple;
use ipog_core::{parse_domain_sizes, BaseAlgorithm, CoveringArray, Generator, RunConfiguration};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Output format for the generated array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Table,
}

/// Covering array generator (IPOG, IPOG-F, IPOG-F2)
#[derive(Parser, Debug)]
#[command(name = "ipog")]
#[command(about = "Generate t-way covering arrays with the IPOG family of strategies")]
#[command(version)]
struct Args {
    /// Domain sizes in exponential notation, e.g. `3^4,2^2`
    #[arg(short, long, required_unless_present = "config", conflicts_with = "config")]
    domains: Option<String>,

    /// JSON run configuration with named parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interaction strength. Overrides the configuration file
    #[arg(short = 't', long)]
    strength: Option<usize>,

    /// Base algorithm: ipog, ipog-f or ipog-f2
    #[arg(short, long)]
    algorithm: Option<BaseAlgorithm>,

    /// Run simulated annealing after each horizontal extension
    #[arg(long)]
    enhance_horizontal: bool,

    /// Let the annealing also modify don't-cares of earlier columns
    #[arg(long, requires = "enhance_horizontal")]
    full_horizontal: bool,

    /// Use the graph-coloring vertical extension
    #[arg(long)]
    adapt_vertical: bool,

    /// Seed for annealing and don't-care randomization
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Replace don't-cares with random values in CSV and table output
    #[arg(long)]
    randomize_dont_cares: bool,

    /// Check the result covers the requested strength
    #[arg(long)]
    verify: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_configuration(&args)?;
    let strength = config.strength;
    info!(
        parameters = config.parameters.len(),
        strength,
        algorithm = %config.algorithm,
        "starting"
    );

    let started = Instant::now();
    let array = Generator::new(config)
        .context("invalid run configuration")?
        .generate()
        .context("generation failed")?;
    info!(
        rows = array.number_of_rows(),
        runtime_ms = started.elapsed().as_millis() as u64,
        "done"
    );

    if args.verify {
        verify(&array, strength)?;
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let rng = args.randomize_dont_cares.then_some(&mut rng);
    print!("{}", render(&array, args.format, rng)?);
    Ok(())
}

/// Fails if some `strength`-way interaction is missing from `array`.
fn verify(array: &CoveringArray, strength: usize) -> Result<()> {
    if let Some(interaction) = first_uncovered_tuple(array, strength) {
        bail!("array does not cover strength {strength}: {interaction:?} is missing");
    }
    info!(strength, "verified");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_configuration(path: &Path) -> Result<RunConfiguration> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Merge the configuration file (if any) with command-line flags. Flags win.
fn resolve_configuration(args: &Args) -> Result<RunConfiguration> {
    let mut config = match (&args.config, &args.domains) {
        (Some(path), _) => load_configuration(path)?,
        (None, Some(expression)) => {
            let parameters = parse_domain_sizes(expression)
                .with_context(|| format!("bad domain expression '{expression}'"))?;
            let strength = args.strength.unwrap_or(2);
            RunConfiguration::builder(parameters, strength, BaseAlgorithm::default()).build()
        }
        (None, None) => bail!("either --domains or --config is required"),
    };

    if let Some(strength) = args.strength {
        config.strength = strength;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if args.enhance_horizontal {
        config.enhance_horizontal = true;
    }
    if args.full_horizontal {
        config.full_horizontal = true;
    }
    if args.adapt_vertical {
        config.adapt_vertical = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn render(array: &CoveringArray, format: Format, rng: Option<&mut StdRng>) -> Result<String> {
    Ok(match format {
        Format::Json => {
            let mut text = serde_json::to_string_pretty(array).context("failed to serialize array")?;
            text.push('\n');
            text
        }
        Format::Csv => match rng {
            Some(rng) => array.to_csv_randomized(rng),
            None => array.to_csv(),
        },
        Format::Table => render_table(&array.records(rng)),
    })
}

/// Column-aligned plain text, one line per row.
fn render_table(records: &[Vec<(String, String)>]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let mut widths: Vec<usize> = first.iter().map(|(name, _)| name.chars().count()).collect();
    for record in records {
        for (width, (_, value)) in widths.iter_mut().zip(record) {
            *width = (*width).max(value.chars().count());
        }
    }

    let names: Vec<&str> = first.iter().map(|(name, _)| name.as_str()).collect();
    let rules: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
    let rules: Vec<&str> = rules.iter().map(String::as_str).collect();
    let mut out = aligned(&names, &widths);
    out.push_str(&aligned(&rules, &widths));
    for record in records {
        let values: Vec<&str> = record.iter().map(|(_, value)| value.as_str()).collect();
        out.push_str(&aligned(&values, &widths));
    }
    out
}

fn aligned(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

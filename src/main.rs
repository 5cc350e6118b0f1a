// In src/main.rs

// bf16-vectors: prepare stimulus for and decode results from the RTL testbench.
//
// With no subcommand, writes the default stimulus file
// (testbench_results/rtl_testbench_inputs.txt, 100 samples over [-10, 10]).

use std::path::{Path, PathBuf};

use anyhow::Context; // For context on Results
use bf16_vectors::{
    config::Config,
    vectors::{self, sigmoid},
    Bf16, SampleRange,
};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "bf16-vectors", about = "bf16 stimulus/response vectors for RTL testbenches")]
struct Cli {
    /// JSON config file overriding the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Write a stimulus file of evenly spaced samples
    Generate(RangeArgs),
    /// Decode a simulator output file, one value per line
    Parse { file: PathBuf },
    /// Encode decimal values as bf16 hex records
    Encode {
        #[arg(allow_negative_numbers = true, required = true)]
        values: Vec<f32>,
    },
    /// Decode bf16 hex records (or decimal values, truncated) to f32
    Decode {
        #[arg(allow_negative_numbers = true, required = true)]
        records: Vec<String>,
    },
    /// Write an `<input> <expected>` test-case file using the sigmoid reference
    Cases(RangeArgs),
    /// Compare simulator outputs against the sigmoid reference
    Compare {
        inputs: PathBuf,
        outputs: PathBuf,
        #[arg(long)]
        tolerance: Option<f32>,
    },
}

#[derive(Args)]
struct RangeArgs {
    #[arg(long, allow_negative_numbers = true)]
    start: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    stop: Option<f32>,
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    output: Option<PathBuf>,
}

impl RangeArgs {
    /// Flags override the config file.
    fn resolve(&self, config: &Config, default_output: &Path) -> anyhow::Result<(SampleRange, PathBuf)> {
        let range = SampleRange::new(
            self.start.unwrap_or(config.generate.start),
            self.stop.unwrap_or(config.generate.stop),
            self.count.unwrap_or(config.generate.count),
        )?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| default_output.to_path_buf());
        Ok((range, output))
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(path) = &cli.config {
        info!("Configuration loaded from {}", path.display());
    }

    match cli.command {
        None => {
            let range = config.generate.range()?;
            vectors::generate_input(&range, &config.generate.output).with_context(|| {
                format!("Failed to generate {}", config.generate.output.display())
            })?;
        }
        Some(Cmd::Generate(args)) => {
            let (range, output) = args.resolve(&config, &config.generate.output)?;
            vectors::generate_input(&range, &output)
                .with_context(|| format!("Failed to generate {}", output.display()))?;
        }
        Some(Cmd::Parse { file }) => {
            let values = vectors::parse_output(&file)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            for value in values {
                println!("{}", value);
            }
        }
        Some(Cmd::Encode { values }) => {
            for value in values {
                println!("{}", Bf16::from_f32_truncate(value));
            }
        }
        Some(Cmd::Decode { records }) => {
            for record in records {
                let value = Bf16::parse_lenient(&record)
                    .with_context(|| format!("Failed to decode '{}'", record))?;
                println!("{}", value.to_f32());
            }
        }
        Some(Cmd::Cases(args)) => {
            let (range, output) = args.resolve(&config, &config.cases.output)?;
            vectors::generate_cases(&range, sigmoid, &output)
                .with_context(|| format!("Failed to generate {}", output.display()))?;
        }
        Some(Cmd::Compare {
            inputs,
            outputs,
            tolerance,
        }) => {
            let tolerance = tolerance.unwrap_or(config.compare.tolerance);
            let input_values = vectors::parse_output(&inputs)
                .with_context(|| format!("Failed to parse {}", inputs.display()))?;
            let output_values = vectors::parse_output(&outputs)
                .with_context(|| format!("Failed to parse {}", outputs.display()))?;
            let result = vectors::compare(&input_values, &output_values, sigmoid, tolerance)?;

            println!("Vectors compared: {}", result.count);
            println!("Passed:           {}", result.count - result.mismatches);
            println!("Failed:           {}", result.mismatches);
            if let Some((index, error)) = result.worst {
                println!("Worst error:      {} (record {})", error, index + 1);
            }
            if !result.passed() {
                warn!("{} outputs outside tolerance {}", result.mismatches, tolerance);
                anyhow::bail!("{} of {} outputs mismatched", result.mismatches, result.count);
            }
        }
    }

    Ok(())
}

//! keyset-gen: write insert/search/delete key files for index benchmarks.
//!
//! Configuration priority: CLI flags > `KEYSET__*` env vars > config file >
//! built-in defaults.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use keyset_bench::{generate_to_files, verify_prefix};
use keyset_engine::config::{generate_example_toml, generate_example_yaml, parse_centers};
use keyset_engine::{
    DeletePolicy, GeneratorConfig, InsertDistKind, Key, LogFormat, MissDistKind, OffsetFallback,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "keyset-gen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate reproducible insert/search/delete key files", long_about = None)]
struct Cli {
    /// Log output format (overrides logging.format)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the three key files
    Generate(GenerateArgs),

    /// Read key files back and report counts and found_count
    Verify {
        /// Prefix the files were written with
        #[arg(long)]
        prefix: String,
    },

    /// Print the default configuration and exit
    PrintConfig {
        #[arg(value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to configuration file (YAML, TOML or JSON)
    #[arg(short, long, env = "KEYSET_CONFIG")]
    config: Option<String>,

    /// Output prefix: <prefix>_insert.txt, <prefix>_search.txt, <prefix>_delete.txt
    #[arg(long)]
    out_prefix: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, allow_negative_numbers = true)]
    key_min: Option<Key>,

    #[arg(long, allow_negative_numbers = true)]
    key_max: Option<Key>,

    #[arg(long)]
    n_insert: Option<usize>,

    #[arg(long)]
    n_search: Option<usize>,

    /// Defaults to n_insert
    #[arg(long)]
    n_delete: Option<usize>,

    #[arg(long)]
    insert_dist: Option<InsertDistKind>,

    /// Mean for normal inserts and normal_retry misses
    #[arg(long, allow_negative_numbers = true)]
    mean: Option<f64>,

    /// Std for normal, clusters and normal_retry
    #[arg(long)]
    std: Option<f64>,

    /// Rate for exp
    #[arg(long)]
    lambd: Option<f64>,

    /// Shape for pareto
    #[arg(long)]
    alpha: Option<f64>,

    /// Comma-separated cluster centers, e.g. 100,1000,5000
    #[arg(long, allow_hyphen_values = true)]
    centers: Option<String>,

    /// Swap fraction for nearly_sorted_unique
    #[arg(long)]
    swap_frac: Option<f64>,

    #[arg(long)]
    delete_mode: Option<DeletePolicy>,

    #[arg(long)]
    hit_ratio: Option<f64>,

    #[arg(long)]
    search_miss_dist: Option<MissDistKind>,

    /// What offset misses do once retries run out
    #[arg(long)]
    offset_fallback: Option<OffsetFallback>,

    /// Values per output line
    #[arg(long)]
    per_line: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl GenerateArgs {
    fn apply(self, config: &mut GeneratorConfig) -> Result<()> {
        if let Some(v) = self.out_prefix {
            config.output.out_prefix = v;
        }
        if let Some(v) = self.per_line {
            config.output.per_line = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.key_min {
            config.key_min = v;
        }
        if let Some(v) = self.key_max {
            config.key_max = v;
        }
        if let Some(v) = self.n_insert {
            config.n_insert = v;
        }
        if let Some(v) = self.n_search {
            config.n_search = v;
        }
        if self.n_delete.is_some() {
            config.n_delete = self.n_delete;
        }
        if let Some(v) = self.insert_dist {
            config.insert_dist = v;
        }
        if let Some(v) = self.mean {
            config.mean = v;
        }
        if let Some(v) = self.std {
            config.std = v;
        }
        if let Some(v) = self.lambd {
            config.lambd = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = self.centers {
            config.centers = parse_centers(&v).context("Invalid --centers")?;
        }
        if let Some(v) = self.swap_frac {
            config.swap_frac = v;
        }
        if let Some(v) = self.delete_mode {
            config.delete_mode = v;
        }
        if let Some(v) = self.hit_ratio {
            config.hit_ratio = v;
        }
        if let Some(v) = self.search_miss_dist {
            config.search_miss_dist = v;
        }
        if let Some(v) = self.offset_fallback {
            config.offset_fallback = v;
        }
        Ok(())
    }
}

fn init_logging(config: &GeneratorConfig, format_override: Option<LogFormatArg>) {
    let log_level = config.logging.level.as_str();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("keyset_engine={},keyset_bench={}", log_level, log_level).into()
    });

    let format = match format_override {
        Some(LogFormatArg::Json) => LogFormat::Json,
        Some(LogFormatArg::Text) => LogFormat::Text,
        None => config.logging.format,
    };

    // stdout carries the report; logs go to stderr
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .json()
                        .with_target(true),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::PrintConfig { format } => match format.to_lowercase().as_str() {
            "yaml" | "yml" => print!("{}", generate_example_yaml()),
            "toml" => print!("{}", generate_example_toml()),
            _ => bail!("Invalid format '{}'. Use 'yaml' or 'toml'.", format),
        },

        Command::Generate(args) => {
            let mut config = GeneratorConfig::load(args.config.as_deref())?;
            args.apply(&mut config)?;
            config.validate()?;

            init_logging(&config, cli.log_format);
            tracing::debug!(?config, "configuration loaded");

            let paths = generate_to_files(&config)?;
            println!("Wrote:");
            for path in paths.iter() {
                println!("  {}", path.display());
            }
        }

        Command::Verify { prefix } => {
            init_logging(&GeneratorConfig::default(), cli.log_format);
            let report = verify_prefix(&prefix)?;
            println!("{}", report);
        }
    }

    Ok(())
}

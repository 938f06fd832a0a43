use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use parbmp::{Filter, Processor, ProcessorConfig, Strategy, WaitMode};

#[derive(Parser, Debug)]
#[command(name = "parbmp", version, about = "Apply a filter to a BMP image on a pool of worker threads")]
struct Args {
    /// Worker threads [default: 2 x logical cores]
    #[arg(long, global = true)]
    threads: Option<usize>,
    /// Rows handled by each queued task
    #[arg(long, global = true, default_value_t = 1)]
    rows_per_task: usize,
    /// How the main thread waits for the workers
    #[arg(long, global = true, value_enum, default_value_t = WaitArg::Spin)]
    wait: WaitArg,
    /// Per-pixel arithmetic
    #[arg(long, global = true, value_enum, default_value_t = StrategyArg::Scalar)]
    strategy: StrategyArg,
    /// Log timings (same as RUST_LOG=info)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    filter: FilterCommand,
}

#[derive(Subcommand, Debug)]
enum FilterCommand {
    /// v' = clamp(round(v * CONTRAST + BRIGHTNESS), 0, 255) on each color channel
    #[command(name = "brightness-contrast")]
    BrightnessContrast {
        #[arg(allow_negative_numbers = true)]
        brightness: f32,
        #[arg(allow_negative_numbers = true)]
        contrast: f32,
        source: PathBuf,
        destination: PathBuf,
    },
    /// Sepia tone
    Sepia { source: PathBuf, destination: PathBuf },
    /// Per-channel median over a K x K window
    Median {
        /// Window side length, odd, 3 to 15
        #[arg(long, short = 'k', default_value_t = parbmp::filter::DEFAULT_MEDIAN_WINDOW)]
        window: usize,
        source: PathBuf,
        destination: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WaitArg {
    Spin,
    Block,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Scalar,
    Wide,
}

impl FilterCommand {
    fn split(&self) -> (Filter, &PathBuf, &PathBuf) {
        match self {
            FilterCommand::BrightnessContrast {
                brightness,
                contrast,
                source,
                destination,
            } => (
                Filter::brightness_contrast(*brightness, *contrast),
                source,
                destination,
            ),
            FilterCommand::Sepia {
                source,
                destination,
            } => (Filter::Sepia, source, destination),
            FilterCommand::Median {
                window,
                source,
                destination,
            } => (Filter::Median { window: *window }, source, destination),
        }
    }
}

fn strategy(arg: StrategyArg) -> Result<Strategy> {
    match arg {
        StrategyArg::Scalar => Ok(Strategy::Scalar),
        #[cfg(feature = "simd")]
        StrategyArg::Wide => Ok(Strategy::Wide),
        #[cfg(not(feature = "simd"))]
        StrategyArg::Wide => bail!("this build has no wide strategy (enable the `simd` feature)"),
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = ProcessorConfig::default()
        .with_rows_per_task(args.rows_per_task)
        .with_strategy(strategy(args.strategy)?)
        .with_wait(match args.wait {
            WaitArg::Spin => WaitMode::Spin,
            WaitArg::Block => WaitMode::Block,
        });
    if let Some(threads) = args.threads {
        if threads == 0 {
            bail!("--threads must be at least 1");
        }
        config = config.with_threads(threads);
    }

    let (filter, source, destination) = args.filter.split();
    let processor = Processor::new(config).context("failed to start the worker pool")?;
    processor
        .process_file(source, destination, &filter)
        .with_context(|| format!("{} failed", filter.name()))?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

use std::io;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use roomgen::{GenerationError, GeneratorConfig, generate, verify_layout};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sweep seeds and floors, checking every layout", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of consecutive seeds to sweep
    #[arg(short, long, default_value_t = 1000)]
    count: u64,
    /// Floors generated per seed
    #[arg(short, long, default_value_t = 5)]
    floors: u32,
    /// TOML generator config; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    println!(
        "Sweeping {} seeds from {} across {} floors...",
        args.count, args.seed, args.floors
    );

    let mut layouts = 0_u64;
    let mut exhausted = 0_u64;
    let mut max_attempts = 0_u32;
    let mut violations = 0_u64;

    for seed in args.seed..args.seed.saturating_add(args.count) {
        for floor in 1..=args.floors {
            let layout = match generate(seed, floor, &config) {
                Ok(layout) => layout,
                Err(GenerationError::Exhausted { attempts, last }) => {
                    warn!(seed, floor, attempts, "gave up: {last}");
                    exhausted += 1;
                    continue;
                }
                Err(error) => return Err(error.into()),
            };

            layouts += 1;
            max_attempts = max_attempts.max(layout.attempts);
            if let Err(violation) = verify_layout(&layout, &config) {
                warn!(seed, floor, "invariant violated: {violation}");
                violations += 1;
            }
        }
    }

    info!(layouts, exhausted, max_attempts, "sweep finished");
    println!("Layouts: {layouts}");
    println!("Exhausted: {exhausted}");
    println!("Most attempts for one floor: {max_attempts}");
    println!("Violations: {violations}");

    if violations > 0 {
        bail!("{violations} layout(s) violated an invariant");
    }
    Ok(())
}

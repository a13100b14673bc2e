//! Flock Simulator CLI
//!
//! Run a seeded flock simulation and print a summary.

use clap::Parser;
use shepherd_sim::{FlockRunner, RunSummary, ShepherdKind};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Flock content-recommendation simulator
#[derive(Parser, Debug)]
#[command(name = "shepherd-sim")]
#[command(about = "Simulate shepherds feeding content to a flock of sheep", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of epochs to simulate
    #[arg(short, long, default_value = "10")]
    epochs: u64,

    /// Shepherd to add to the flock (repeatable: dummy, tagged, mixed)
    #[arg(short = 'S', long = "shepherd", default_value = "dummy")]
    shepherds: Vec<ShepherdKind>,

    /// List the available shepherds and exit
    #[arg(long)]
    list: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,
}

fn print_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "Epoch {}: {} tags ({} groups, {} orphans), {} items, {} sheep",
        stats.epoch, stats.n_tags, stats.n_groups, stats.n_orphans, stats.n_items, stats.n_sheep
    );
    info!("Graph: {} edges, density {:.4}", stats.n_edges, stats.density);
    for shepherd in &summary.shepherds {
        info!("  {} {}: {} items shown", shepherd.kind, shepherd.id, shepherd.exposure);
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the flag
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if args.list {
        for kind in ShepherdKind::all() {
            println!("{:<8} {}", kind.name(), kind.description());
        }
        return;
    }

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    } else {
        args.seed
    };

    if !args.json {
        info!("Flock Simulator v{}", env!("CARGO_PKG_VERSION"));
    }

    let runner = FlockRunner::new(seed)
        .with_epochs(args.epochs)
        .with_shepherds(args.shepherds);

    let summary = match runner.run() {
        Ok(summary) => summary,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&summary);
    }
}

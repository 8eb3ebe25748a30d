//! Command-line front end for the pipeline sort.
//!
//! Generates a seeded pseudo-random sequence, pushes it through the
//! comparator chain, and reports the drained count, the correctness flag
//! and the elapsed wall-clock time.

use clap::Parser;
use pipeline_sort::{seeded_values, SortPipeline};

#[derive(Parser, Debug)]
#[command(name = "pipeline-sort", version, about = "Sorts a stream of values through a dynamically grown chain of compare-and-forward stages")]
struct Args {
    /// Number of values to generate and sort
    #[arg(short = 'l', long, default_value_t = 100)]
    count: usize,

    /// Seed for the deterministic value generator
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Capacity of every channel between stages (must be >= 1)
    #[arg(short, long, default_value_t = 1)]
    buffer_capacity: usize,

    /// Print every value the sink receives, in arrival order
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut pipeline = SortPipeline::new().with_buffer_capacity(args.buffer_capacity);
    if args.verbose {
        pipeline = pipeline.observe(|value: &u32| println!("{value}"));
    }

    match pipeline.run(seeded_values(args.seed, args.count)) {
        Ok(report) => {
            println!(
                "Parameters: -b {} -l {} -s {}",
                args.buffer_capacity, args.count, args.seed
            );
            println!("Total received numbers: {}", report.received);
            println!("Correctness (ASC): {}", report.sorted);
            println!("Stages spawned: {}", report.stages);
            println!("Time: {:.6e}", report.elapsed.as_secs_f64());
        }
        Err(error) => {
            eprintln!("pipeline-sort: {error}");
            std::process::exit(1);
        }
    }
}

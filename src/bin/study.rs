//! Runs the waiting-time study: the closed-system and open-system sweeps
//! over the default axes, each printed as a table of average waiting time
//! per population size.
//!
//! Progress is logged through `RUST_LOG`; by default each finished sweep
//! point is reported at `info` level.

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use multiprog_sim::report;
use multiprog_sim::Sweep;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,multiprog_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    for (title, sweep) in [
        ("Fixed population", Sweep::fixed_population()),
        ("Open arrival stream", Sweep::open_stream()),
    ] {
        match sweep.run() {
            Ok(results) => {
                println!("{}", title);
                println!("{}", report::render(&results));
            }
            Err(e) => {
                error!(sweep = title, "{}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

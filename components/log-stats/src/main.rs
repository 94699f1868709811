//! `log-stats` binary: aggregates access log lines from stdin or a file.

use anyhow::Result;
use log_stats::cli;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Main entrypoint simply delegates control to CLI layer.
    let result = runtime.block_on(cli::cli::run());

    // A blocking stdin read cannot be cancelled, do not wait for it on exit
    runtime.shutdown_background();
    result
}

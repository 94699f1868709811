// Local crates
use crate::{
    helpers::{
        errors::StatsError,
        load_config::{Config, DEFAULT_CADENCE, UnknownStatusPolicy},
        shutdown::Shutdown,
    },
    instrumentation::tracing::{init_panic_handler, init_tracing},
    metrics::metrics::Metrics,
    parser::parser::AccessLog,
    reporter::reporter,
    tailer::reader::open_source,
};

// External crates
use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::instrument;

const LINE_CAPACITY: usize = 512;

/// Why the stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The input source had no more lines
    EndOfStream,
    /// Shutdown was triggered while waiting for the next line
    Interrupted,
}

/// Knobs for a [`StreamDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Processed lines between two periodic snapshots
    pub cadence: u64,
    /// Handling of status codes outside the tracked set
    pub unknown_status: UnknownStatusPolicy,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
            unknown_status: UnknownStatusPolicy::default(),
        }
    }
}

impl From<&Config> for DriverOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            cadence: cfg.report.cadence,
            unknown_status: cfg.metrics.unknown_status,
        }
    }
}

/// Final state of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the stream stopped
    pub termination: Termination,
    /// Lines read, malformed ones included
    pub lines_processed: u64,
    /// Totals at termination
    pub metrics: Metrics,
}

/// Outcome of waiting for the next line
enum NextLine {
    Interrupted,
    Read(std::io::Result<usize>),
}

/// Reads access log lines in arrival order, folds them into [`Metrics`] and
/// writes a snapshot every `cadence` lines plus exactly one final snapshot
/// when the stream ends or is interrupted.
///
/// ```text
/// StreamDriver -> AccessLog::parse -> Metrics::update -> reporter::snapshot -> output
/// ```
///
/// Interruption is only observed between lines: a line handed out by the
/// reader is always fully accounted for before the driver stops.
#[derive(Debug)]
pub struct StreamDriver<R, W> {
    reader: R,
    output: W,
    options: DriverOptions,
    shutdown: Shutdown,
    metrics: Metrics,
    lines_processed: u64,
}

impl<R, W> StreamDriver<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// A driver in its running state with zeroed totals. A zero cadence is
    /// treated as one.
    pub fn new(reader: R, output: W, options: DriverOptions, shutdown: Shutdown) -> Self {
        Self {
            reader,
            output,
            options: DriverOptions {
                cadence: options.cadence.max(1),
                ..options
            },
            shutdown,
            metrics: Metrics::new(),
            lines_processed: 0,
        }
    }

    /// Drives the stream until end-of-stream or interruption.
    ///
    /// The final snapshot is written on every path out of the loop, including
    /// the error paths (read failure, rejected status code). Errors are
    /// returned after that snapshot.
    #[instrument(
        name = "log_stats_runtime::stream_driver",
        target = "runtime::runtime::StreamDriver",
        skip_all,
        fields(cadence = self.options.cadence),
        level = "debug"
    )]
    pub async fn run(mut self) -> Result<RunSummary, StatsError> {
        tracing::debug!("Stream driver running");

        let outcome = self.drive().await;

        // Terminated: report once more, whatever the counter says
        self.emit_snapshot().await?;
        let termination = outcome?;

        tracing::info!(
            ?termination,
            lines_processed = self.lines_processed,
            total_file_size = self.metrics.total_file_size(),
            "Stream driver terminated"
        );

        Ok(RunSummary {
            termination,
            lines_processed: self.lines_processed,
            metrics: self.metrics,
        })
    }

    async fn drive(&mut self) -> Result<Termination, StatsError> {
        let mut buf = Vec::with_capacity(LINE_CAPACITY);

        loop {
            // Shutdown is polled first so a busy reader cannot starve it.
            // read_until keeps partial bytes in `buf`, nothing is lost between polls.
            let next = tokio::select! {
                biased;
                _ = self.shutdown.wait_for_shutdown() => NextLine::Interrupted,
                read = self.reader.read_until(b'\n', &mut buf) => NextLine::Read(read),
            };

            match next {
                NextLine::Interrupted => {
                    if !buf.is_empty() {
                        tracing::debug!(
                            partial_bytes = buf.len(),
                            "Discarding partially read line on interruption"
                        );
                    }
                    return Ok(Termination::Interrupted);
                }
                NextLine::Read(Ok(0)) => return Ok(Termination::EndOfStream),
                NextLine::Read(Ok(_)) => {
                    self.process_line(&buf).await?;
                    buf.clear();
                }
                NextLine::Read(Err(e)) => {
                    tracing::error!(error = %e, "Failed to read from input stream");
                    return Err(StatsError::Read(e));
                }
            }
        }
    }

    async fn process_line(&mut self, raw: &[u8]) -> Result<(), StatsError> {
        // Invalid UTF-8 is just another malformed line
        let record = std::str::from_utf8(raw).ok().and_then(AccessLog::parse);

        match record {
            Some(record) => self.metrics.update(&record, self.options.unknown_status)?,
            None => tracing::trace!(
                line_number = self.lines_processed + 1,
                "Skipping malformed access log line"
            ),
        }

        self.lines_processed += 1;
        if self.lines_processed % self.options.cadence == 0 {
            self.emit_snapshot().await?;
        }

        Ok(())
    }

    async fn emit_snapshot(&mut self) -> Result<(), StatsError> {
        let text = reporter::snapshot(&self.metrics);

        self.output
            .write_all(text.as_bytes())
            .await
            .map_err(StatsError::Write)?;
        self.output.flush().await.map_err(StatsError::Write)?;

        tracing::debug!(
            lines_processed = self.lines_processed,
            "Snapshot written"
        );
        Ok(())
    }
}

/// log-stats runtime initialization and setup.
///
/// Loads the configuration, installs diagnostics and the interrupt listener,
/// then drives the access log source into standard output.
pub async fn run_log_stats(config_path: Option<&Path>, input_path: Option<&Path>) -> Result<()> {
    let cfg = Config::load_or_default(config_path)?;

    init_panic_handler();
    // Held until return so the rolling file writer flushes
    let _log_guard = init_tracing(&cfg.logging)?;

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();

    let source = open_source(input_path).await?;
    let driver = StreamDriver::new(
        source,
        tokio::io::stdout(),
        DriverOptions::from(&cfg),
        shutdown,
    );
    let summary = driver.run().await?;

    tracing::debug!(
        termination = ?summary.termination,
        lines_processed = summary.lines_processed,
        "log-stats finished"
    );
    Ok(())
}

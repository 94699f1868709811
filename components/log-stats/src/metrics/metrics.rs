// Local crates
use crate::{
    helpers::{errors::StatsError, load_config::UnknownStatusPolicy},
    parser::parser::AccessLog,
};

// External crates
use std::collections::BTreeMap;
use tracing::instrument;

/// The fixed set of status codes that get their own counter, in ascending order.
pub const TRACKED_STATUS_CODES: [&str; 8] = ["200", "301", "400", "401", "403", "404", "405", "500"];

/// Cumulative totals since the stream started.
///
/// The key set of `status_counts` is fixed at construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    total_file_size: u64,
    status_counts: BTreeMap<&'static str, u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Zeroed totals with a counter for every tracked status code
    pub fn new() -> Self {
        Self {
            total_file_size: 0,
            status_counts: TRACKED_STATUS_CODES.iter().map(|code| (*code, 0)).collect(),
        }
    }

    /// Sum of the file sizes counted so far
    pub fn total_file_size(&self) -> u64 {
        self.total_file_size
    }

    /// Count for `code`, `None` when the code is not tracked.
    pub fn status_count(&self, code: &str) -> Option<u64> {
        self.status_counts.get(code).copied()
    }

    /// Tracked status codes with their counts, ascending by code.
    pub fn status_counts(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.status_counts.iter().map(|(code, count)| (*code, *count))
    }

    /// Folds one parsed access log line into the totals.
    ///
    /// A tracked status code adds the file size and bumps its counter. For any
    /// other code `policy` decides: [`UnknownStatusPolicy::Ignore`] still adds
    /// the file size, [`UnknownStatusPolicy::Fatal`] rejects the line and
    /// leaves the totals untouched.
    #[instrument(
        name = "log_stats_metrics::update",
        target = "metrics::metrics::Metrics",
        skip_all,
        level = "trace"
    )]
    pub fn update(
        &mut self,
        record: &AccessLog,
        policy: UnknownStatusPolicy,
    ) -> Result<(), StatsError> {
        match self.status_counts.get_mut(record.status_code.as_str()) {
            Some(count) => *count += 1,
            None => match policy {
                UnknownStatusPolicy::Ignore => {
                    tracing::debug!(
                        status_code = %record.status_code,
                        file_size = record.file_size,
                        "Status code is not tracked, counting file size only"
                    );
                }
                UnknownStatusPolicy::Fatal => {
                    tracing::error!(
                        status_code = %record.status_code,
                        "Status code is not tracked, rejecting line"
                    );
                    return Err(StatsError::UnknownStatusCode {
                        code: record.status_code.clone(),
                    });
                }
            },
        }

        self.total_file_size = self.total_file_size.saturating_add(record.file_size);
        Ok(())
    }
}

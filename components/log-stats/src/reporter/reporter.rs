// Local crates
use crate::metrics::metrics::Metrics;

// External crates
use std::fmt::Write;

/// Renders the cumulative totals as a plain text snapshot.
///
/// ```text
/// File size: <total file size>
/// <status code>: <count>
/// ```
///
/// Status code lines follow in ascending order and only for codes seen at
/// least once. Rendering never touches `metrics`, so two calls without an
/// update in between return the same text.
pub fn snapshot(metrics: &Metrics) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "File size: {}", metrics.total_file_size());
    for (code, count) in metrics.status_counts().filter(|(_, count)| *count > 0) {
        let _ = writeln!(out, "{code}: {count}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{helpers::load_config::UnknownStatusPolicy, parser::parser::AccessLog};
    use pretty_assertions::assert_eq;

    fn feed(metrics: &mut Metrics, status: &str, size: u64) {
        let record = AccessLog {
            ip: "127.0.0.1".into(),
            date: "[05/Feb/2017:23:31:22]".into(),
            request: "\"GET / HTTP/1.1\"".into(),
            status_code: status.into(),
            file_size: size,
        };
        metrics.update(&record, UnknownStatusPolicy::Ignore).unwrap();
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(snapshot(&Metrics::new()), "File size: 0\n");
    }

    #[test]
    fn test_snapshot_skips_zero_counts() {
        let mut metrics = Metrics::new();
        feed(&mut metrics, "404", 50);
        feed(&mut metrics, "404", 150);

        assert_eq!(snapshot(&metrics), "File size: 200\n404: 2\n");
    }

    #[test]
    fn test_snapshot_orders_codes_ascending() {
        let mut metrics = Metrics::new();
        feed(&mut metrics, "500", 1);
        feed(&mut metrics, "200", 2);
        feed(&mut metrics, "401", 3);
        feed(&mut metrics, "200", 4);

        assert_eq!(
            snapshot(&metrics),
            "File size: 10\n200: 2\n401: 1\n500: 1\n"
        );
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut metrics = Metrics::new();
        feed(&mut metrics, "301", 12);

        let first = snapshot(&metrics);
        let second = snapshot(&metrics);
        assert_eq!(first, second);
    }
}

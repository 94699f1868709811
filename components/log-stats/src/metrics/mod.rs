/// Cumulative byte and status code totals
pub mod metrics;

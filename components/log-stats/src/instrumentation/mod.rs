/// Diagnostics subscriber and panic hook
pub mod tracing;

/// Typed errors
pub mod errors;
/// TOML configuration
pub mod load_config;
/// Interrupt handling
pub mod shutdown;

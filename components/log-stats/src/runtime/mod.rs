/// The stream driver and process wiring
pub mod runtime;

/// Command line definition and dispatch
pub mod cli;

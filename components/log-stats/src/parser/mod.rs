/// Access log line parsing
pub mod parser;

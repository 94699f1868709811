/// Opening the access log line source
pub mod reader;

pub mod fetcher;
pub mod incidents;
pub mod parser;
pub mod types;

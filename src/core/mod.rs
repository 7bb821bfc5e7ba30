pub mod config;
pub mod feed;
pub mod importer;
pub mod pipeline;
pub mod sink;
pub mod status;

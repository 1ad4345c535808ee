pub mod config;
pub mod generate;
pub mod graph;
pub mod metadata;
pub mod report;
pub mod runtime;
pub mod scan;

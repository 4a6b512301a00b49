pub mod analyzers;
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod output;
pub mod stats;

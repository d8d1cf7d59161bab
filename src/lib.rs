pub mod aggregate;
pub mod config;
pub mod cursor;
pub mod error;
pub mod export;
pub mod gol_source;
pub mod ingest;
pub mod logging;
pub mod memory_source;
pub mod pipeline_state;
pub mod registry;
pub mod runner;
pub mod scoring;
pub mod slot_index;
pub mod source;
pub mod stat_log;
pub mod stat_row;
pub mod stats_store;

pub mod commands;
pub mod config;
pub mod copyright;
pub mod kakasi;

pub mod adapters;
pub mod app;
pub mod bridge;
pub mod config;
pub mod error;

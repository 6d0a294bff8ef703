pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod results;
pub mod session;
pub mod shell;
pub mod stats;
pub mod upload;

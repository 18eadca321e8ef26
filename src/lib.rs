pub mod config;
pub mod error;
pub mod format;
pub mod http_client;
pub mod lichess_api;
pub mod logging;
pub mod models;
pub mod provider;
pub mod state;

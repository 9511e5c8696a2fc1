pub mod api;
pub mod config;
pub mod grouping;
pub mod http_client;
pub mod logging;
pub mod outcome;
pub mod provider;
pub mod route;
pub mod state;
pub mod ui;

pub mod api;
pub mod config;
pub mod display;
pub mod http_response;
pub mod network_provider;
pub mod services;
pub mod templates;

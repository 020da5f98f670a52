pub mod api;
pub mod authorize;
pub mod config;
pub mod token;

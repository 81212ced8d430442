pub mod app_config;
pub mod console;
pub mod error;
pub mod logging;
pub mod speech;

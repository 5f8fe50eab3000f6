//! Configuration domain module

mod app_config;

pub use app_config::{is_valid_volume, parse_volume, AppConfig, DEFAULT_VOLUME, MAX_VOLUME};

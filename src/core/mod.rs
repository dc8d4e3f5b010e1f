mod config;

pub use config::{AppConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL};

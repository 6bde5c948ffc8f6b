pub mod config;

pub use config::{AppConfig, ScanArgs, load_and_merge_config};

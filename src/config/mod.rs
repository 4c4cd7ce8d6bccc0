//! Configuration module for Sift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The resulting [`Config`] is the single record handed to the crawl engine.
//!
//! # Example
//!
//! ```no_run
//! use sift_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sift.toml")).unwrap();
//! println!("Crawler will process at most {} pages", config.limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DEFAULT_CACHE_DIR, DEFAULT_CACHE_LIMIT, DEFAULT_MAX_REDIRECTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WORKERS, MAX_WORKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::validate;

//! Filesystem persistence for get5 match documents.
//!
//! This crate resolves paths, reads and atomically writes match documents,
//! and loads the YAML tool configuration that tells the CLI where those
//! documents live.
//!
//! # Quick start
//!
//! ```no_run
//! use get5_config_core::{MatchOverrides, prepare_match};
//! use get5_config_store::{ToolConfig, load_match, save_match};
//!
//! let config = ToolConfig::load("get5-config.yml").unwrap();
//! let input = config.input_path().unwrap();
//! let output = config.output_path().unwrap();
//!
//! let base = load_match(&input).unwrap();
//! let doc = prepare_match(base, &MatchOverrides::default()).unwrap();
//! save_match(&output, &doc).unwrap();
//! ```

mod config;
mod error;
mod file;

pub use config::{Paths, ToolConfig};
pub use error::{Result, StoreError};
pub use file::{load, load_match, resolve_path, save, save_match};

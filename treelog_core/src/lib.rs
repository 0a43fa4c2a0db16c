#![forbid(unsafe_code)]

//! Hierarchical, namespace-based logging framework.
//!
//! This crate provides:
//! - Named loggers in a dotted-name tree (`"app.db.pool"`)
//! - Level inheritance with cached effective-level resolution
//! - Record construction and ancestor-chain dispatch
//! - Template formatters and stream/file handlers
//! - One-shot basic configuration
//!
//! Callers obtain loggers from a [`Manager`] (an explicit, testable
//! context object, not a process global) and emit leveled messages with
//! contextual data; the tree decides which handlers see each record.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod level;
pub mod logger;
pub mod manager;
pub mod record;

// Re-export commonly used types
pub use config::{basic_config, BasicConfig};
pub use error::{Error, Result};
pub use formatter::{Formatter, BASIC_FORMAT};
pub use handler::{ErrorHook, FileHandler, FileMode, Handler, StreamHandler};
pub use level::Level;
pub use logger::Logger;
pub use manager::{Manager, ROOT_NAME};
pub use record::Record;

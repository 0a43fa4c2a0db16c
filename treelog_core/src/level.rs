//! Severity levels.
//!
//! Levels are a strictly increasing integer scale; admission at every gate
//! (logger effective level, handler threshold) is numeric comparison, not
//! enum identity. The built-in constants mirror the conventional scale
//! (DEBUG=10 .. CRITICAL=50) but any integer is a valid level.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An integer severity level.
///
/// Ordering is numeric: `Level::DEBUG < Level::INFO < Level::WARNING`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    /// Inherit sentinel. A logger whose level is unset resolves through its
    /// ancestors; a handler constructed without an explicit level admits
    /// every record. Never a valid level for an emitted record.
    pub const NOTSET: Level = Level(0);

    pub const DEBUG: Level = Level(10);
    pub const INFO: Level = Level(20);
    pub const WARNING: Level = Level(30);
    pub const ERROR: Level = Level(40);
    pub const CRITICAL: Level = Level(50);

    /// Create a level from an arbitrary integer value.
    pub const fn new(value: i32) -> Level {
        Level(value)
    }

    /// The raw integer value of this level.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            0 => "NOTSET",
            10 => "DEBUG",
            20 => "INFO",
            30 => "WARNING",
            40 => "ERROR",
            50 => "CRITICAL",
            other => return write!(f, "Level {}", other),
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Parse a level from a case-insensitive name or a bare integer.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::DEBUG),
            "INFO" => Ok(Level::INFO),
            "WARNING" | "WARN" => Ok(Level::WARNING),
            "ERROR" => Ok(Level::ERROR),
            "CRITICAL" => Ok(Level::CRITICAL),
            _ => s
                .parse::<i32>()
                .map(Level::new)
                .map_err(|_| Error::Config(format!("unknown log level `{}`", s))),
        }
    }
}

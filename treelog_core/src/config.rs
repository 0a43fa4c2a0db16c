//! One-shot basic configuration.
//!
//! [`basic_config`] wires a single handler onto the root logger the way
//! simple programs expect: a stderr stream handler by default, or a file
//! handler when a filename is given. It does nothing if the root already
//! has handlers, which protects multi-entry-point programs from
//! double-initialization.

use crate::{
    FileHandler, FileMode, Formatter, Handler, Level, Manager, Result, StreamHandler, BASIC_FORMAT,
};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recognized one-shot configuration options, each with a documented
/// default. An explicit structure replaces the keyword-dictionary style of
/// configuration; unknown options cannot be expressed.
#[derive(Default)]
pub struct BasicConfig {
    /// Attach a file sink at this path instead of a stream sink.
    pub filename: Option<PathBuf>,
    /// Open mode for the file sink. Default: append.
    pub filemode: FileMode,
    /// Formatter template. Default: [`BASIC_FORMAT`].
    pub format: Option<String>,
    /// Date pattern for `{asctime}`. Default: the formatter's built-in.
    pub datefmt: Option<String>,
    /// Root logger level. Default: leave the root level unchanged.
    pub level: Option<Level>,
    /// Stream for the stream sink. Default: standard error. Ignored when
    /// `filename` is set.
    pub stream: Option<Box<dyn Write + Send>>,
}

/// On-disk form of [`BasicConfig`]: levels and modes as strings, parsed via
/// `FromStr`. A stream cannot be named in a file, so there is no `stream`
/// key; unknown keys are configuration errors.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    filename: Option<PathBuf>,
    filemode: Option<String>,
    format: Option<String>,
    datefmt: Option<String>,
    level: Option<String>,
}

impl BasicConfig {
    /// Load configuration options from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&contents)?;

        let mut config = BasicConfig {
            filename: file.filename,
            format: file.format,
            datefmt: file.datefmt,
            ..BasicConfig::default()
        };
        if let Some(mode) = file.filemode {
            config.filemode = mode.parse()?;
        }
        if let Some(level) = file.level {
            config.level = Some(level.parse()?);
        }
        tracing::info!("Loaded logging config from {:?}", path);
        Ok(config)
    }
}

/// Configure the root logger with a single handler.
///
/// No-ops if the root already has handlers attached. `filename` wins over
/// `stream` when both are present. Configuration errors (unopenable file,
/// bad template) surface synchronously; nothing is attached on failure.
pub fn basic_config(manager: &Manager, config: BasicConfig) -> Result<()> {
    let root = manager.root();
    if root.has_handlers() {
        tracing::debug!("root logger already has handlers, skipping basic_config");
        return Ok(());
    }

    let handler: Arc<dyn Handler> = match config.filename {
        Some(path) => Arc::new(FileHandler::new(path, config.filemode)?),
        None => match config.stream {
            Some(stream) => Arc::new(StreamHandler::new(stream)),
            None => Arc::new(StreamHandler::stderr()),
        },
    };

    let template = config.format.as_deref().unwrap_or(BASIC_FORMAT);
    let formatter = Formatter::new(template, config.datefmt.as_deref())?;
    handler.set_formatter(formatter);
    root.add_handler(handler);

    if let Some(level) = config.level {
        root.set_level(level);
    }
    Ok(())
}

use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use treelog_core::*;

#[derive(Parser)]
#[command(name = "treelog")]
#[command(about = "Hierarchical namespace logging emitter", long_about = None)]
struct Cli {
    /// TOML file with handler options (filename, filemode, format, datefmt, level)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dotted logger name; defaults to the root logger
    #[arg(long)]
    logger: Option<String>,

    /// Severity to log at (name or integer)
    #[arg(long, default_value = "info")]
    level: String,

    /// Write to this file instead of stderr
    #[arg(long)]
    file: Option<PathBuf>,

    /// Open mode for --file (append or truncate)
    #[arg(long)]
    filemode: Option<String>,

    /// Formatter template, e.g. "{asctime} {levelname}:{name}:{message}"
    #[arg(long)]
    format: Option<String>,

    /// Date pattern for {asctime}
    #[arg(long)]
    datefmt: Option<String>,

    /// Message template; {key} placeholders come from KEY=VALUE arguments
    message: String,

    /// Context values as KEY=VALUE pairs (values parsed as JSON, else strings)
    context: Vec<String>,
}

fn main() -> Result<()> {
    treelog_core::diagnostics::init();

    let cli = Cli::parse();
    let level: Level = cli.level.parse()?;

    let mut config = match &cli.config {
        Some(path) => BasicConfig::load_from(path)?,
        None => BasicConfig::default(),
    };

    // Flags override the config file
    if cli.file.is_some() {
        config.filename = cli.file.clone();
    }
    if let Some(mode) = &cli.filemode {
        config.filemode = mode.parse()?;
    }
    if cli.format.is_some() {
        config.format = cli.format.clone();
    }
    if cli.datefmt.is_some() {
        config.datefmt = cli.datefmt.clone();
    }
    // Unless the config file pinned a root level, open the root up to the
    // requested severity so the record is not suppressed by default
    if config.level.is_none() {
        config.level = Some(level);
    }

    let manager = Manager::new(Level::WARNING);
    basic_config(&manager, config)?;

    let logger = match &cli.logger {
        Some(name) => manager.get_logger(name)?,
        None => manager.root(),
    };

    let context = parse_context(&cli.context)?;
    let pairs: Vec<(&str, Value)> = context
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    logger.log(level, &cli.message, &pairs);

    for handler in manager.root().handlers() {
        handler.close();
    }
    Ok(())
}

fn parse_context(args: &[String]) -> Result<Vec<(String, Value)>> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                Error::Config(format!("context argument `{}` is not KEY=VALUE", arg))
            })?;
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            Ok((key.to_string(), value))
        })
        .collect()
}

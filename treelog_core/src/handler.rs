//! Output handlers.
//!
//! A [`Handler`] filters records against its own threshold, renders them
//! through its [`Formatter`] (or the raw-message default), and writes the
//! result to a sink. Emission-time write failures are reported through the
//! handler's error hook rather than propagating into the caller: logging
//! must never crash the application that uses it.

use crate::{Error, Formatter, Level, Record, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

/// Out-of-band channel for emission-time sink failures.
pub type ErrorHook = Box<dyn Fn(&Record, &io::Error) + Send + Sync>;

/// Capability contract for output sinks.
///
/// Implementations must serialize writes to their own sink: concurrent
/// `emit` calls must not interleave partial lines.
pub trait Handler: Send + Sync {
    /// This handler's own threshold, independent of any logger's level.
    /// Defaults to [`Level::NOTSET`], which admits every record.
    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    fn set_formatter(&self, formatter: Formatter);

    /// Render and write one record. Must not panic or return errors to the
    /// caller; failures go to the handler's error path.
    fn emit(&self, record: &Record);

    /// Flush and release the sink. Must be safe to call more than once.
    fn close(&self);

    /// Threshold-checked emission. The dispatch walk already filters by
    /// handler level, but a handler must be independently correct when
    /// invoked outside the tree walk.
    fn handle(&self, record: &Record) {
        if record.level() >= self.level() {
            self.emit(record);
        }
    }
}

/// State shared by the built-in handler variants.
struct HandlerCommon {
    level: AtomicI32,
    formatter: RwLock<Option<Formatter>>,
    error_hook: RwLock<Option<ErrorHook>>,
}

impl HandlerCommon {
    fn new() -> Self {
        Self {
            level: AtomicI32::new(Level::NOTSET.value()),
            formatter: RwLock::new(None),
            error_hook: RwLock::new(None),
        }
    }

    fn level(&self) -> Level {
        Level::new(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: Level) {
        self.level.store(level.value(), Ordering::Relaxed);
    }

    fn set_formatter(&self, formatter: Formatter) {
        *self
            .formatter
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(formatter);
    }

    fn set_error_hook(&self, hook: ErrorHook) {
        *self
            .error_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    fn render(&self, record: &Record) -> String {
        let formatter = self
            .formatter
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match &*formatter {
            Some(formatter) => formatter.format(record),
            None => Formatter::default().format(record),
        }
    }

    fn report_failure(&self, record: &Record, err: &io::Error) {
        let hook = self
            .error_hook
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match &*hook {
            Some(hook) => hook(record, err),
            None => tracing::error!(
                "log handler write failed for logger `{}`: {}",
                record.name(),
                err
            ),
        }
    }
}

fn write_line(writer: &mut dyn Write, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Writes to a pre-opened, externally-owned stream.
///
/// The stream is never closed by this handler; callers may hand over a
/// shared stderr/stdout-like stream. `close` only flushes.
pub struct StreamHandler {
    common: HandlerCommon,
    stream: Mutex<Box<dyn Write + Send>>,
}

impl StreamHandler {
    pub fn new(stream: Box<dyn Write + Send>) -> Self {
        Self {
            common: HandlerCommon::new(),
            stream: Mutex::new(stream),
        }
    }

    /// Stream handler over standard error, the default sink.
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Install the out-of-band channel for write failures.
    pub fn set_error_hook(&self, hook: ErrorHook) {
        self.common.set_error_hook(hook);
    }
}

impl Handler for StreamHandler {
    fn level(&self) -> Level {
        self.common.level()
    }

    fn set_level(&self, level: Level) {
        self.common.set_level(level);
    }

    fn set_formatter(&self, formatter: Formatter) {
        self.common.set_formatter(formatter);
    }

    fn emit(&self, record: &Record) {
        let line = self.common.render(record);
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        let result = write_line(&mut **stream, &line);
        drop(stream);
        if let Err(err) = result {
            self.common.report_failure(record, &err);
        }
    }

    fn close(&self) {
        // Externally-owned stream: flush but never close
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = stream.flush() {
            tracing::warn!("flush on close failed: {}", err);
        }
    }
}

/// Open mode for a [`FileHandler`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileMode {
    #[default]
    Append,
    Truncate,
}

impl std::str::FromStr for FileMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "append" | "a" => Ok(FileMode::Append),
            "truncate" | "w" => Ok(FileMode::Truncate),
            other => Err(Error::Config(format!("unknown file mode `{}`", other))),
        }
    }
}

/// Owns an opened log file.
///
/// The file is opened at construction time, so an unopenable path fails the
/// configuration call rather than the first emit. Each write takes an
/// exclusive advisory lock so appends from other processes sharing the file
/// do not interleave.
pub struct FileHandler {
    common: HandlerCommon,
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileHandler {
    pub fn new(path: impl Into<PathBuf>, mode: FileMode) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            FileMode::Append => options.append(true),
            FileMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(&path)?;

        tracing::debug!("Opened log file {:?} ({:?})", path, mode);
        Ok(Self {
            common: HandlerCommon::new(),
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Install the out-of-band channel for write failures.
    pub fn set_error_hook(&self, hook: ErrorHook) {
        self.common.set_error_hook(hook);
    }
}

impl Handler for FileHandler {
    fn level(&self) -> Level {
        self.common.level()
    }

    fn set_level(&self, level: Level) {
        self.common.set_level(level);
    }

    fn set_formatter(&self, formatter: Formatter) {
        self.common.set_formatter(formatter);
    }

    fn emit(&self, record: &Record) {
        let line = self.common.render(record);
        let guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(file) = guard.as_ref() else {
            self.common.report_failure(
                record,
                &io::Error::new(io::ErrorKind::Other, "handler is closed"),
            );
            return;
        };

        let result = (|| {
            file.lock_exclusive()?;
            let mut writer = BufWriter::new(file);
            write_line(&mut writer, &line)?;
            drop(writer);
            file.unlock()
        })();

        if let Err(err) = result {
            let _ = file.unlock();
            drop(guard);
            self.common.report_failure(record, &err);
        }
    }

    fn close(&self) {
        // Idempotent: the file is taken on the first call, later calls no-op
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = guard.take() {
            if let Err(err) = file.sync_all() {
                tracing::warn!("sync on close of {:?} failed: {}", self.path, err);
            }
            tracing::debug!("Closed log file {:?}", self.path);
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

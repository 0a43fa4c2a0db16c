//! Named logger nodes.
//!
//! A [`Logger`] is one node in the dotted-name tree: an optional explicit
//! level, a back-reference to its parent, an ordered handler list, and a
//! propagation flag. The level check happens before any record is built or
//! rendered, so a suppressed call costs a cache lookup and nothing more.

use crate::{Handler, Level, Record};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A named node in the severity-filtering tree.
///
/// Loggers are created through [`crate::Manager::get_logger`] and shared as
/// `Arc<Logger>`; all state is interior-mutable and thread-safe.
pub struct Logger {
    name: String,
    is_root: bool,
    /// NOTSET means "inherit from the nearest ancestor with a set level"
    level: AtomicI32,
    parent: RwLock<Option<Arc<Logger>>>,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
    propagate: AtomicBool,
    /// Cached effective level, valid only while the epoch matches
    cache: RwLock<Option<(u64, Level)>>,
    /// Shared with the manager; bumped on any level or tree change
    epoch: Arc<AtomicU64>,
}

impl Logger {
    pub(crate) fn new(name: String, epoch: Arc<AtomicU64>) -> Arc<Logger> {
        Arc::new(Logger {
            name,
            is_root: false,
            level: AtomicI32::new(Level::NOTSET.value()),
            parent: RwLock::new(None),
            handlers: RwLock::new(Vec::new()),
            propagate: AtomicBool::new(true),
            cache: RwLock::new(None),
            epoch,
        })
    }

    pub(crate) fn new_root(name: String, level: Level, epoch: Arc<AtomicU64>) -> Arc<Logger> {
        Arc::new(Logger {
            name,
            is_root: true,
            level: AtomicI32::new(level.value()),
            parent: RwLock::new(None),
            handlers: RwLock::new(Vec::new()),
            propagate: AtomicBool::new(true),
            cache: RwLock::new(None),
            epoch,
        })
    }

    /// Dotted name of this logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This logger's explicit level, if one is set.
    pub fn level(&self) -> Option<Level> {
        let value = self.level.load(Ordering::Relaxed);
        if value == Level::NOTSET.value() {
            None
        } else {
            Some(Level::new(value))
        }
    }

    /// Set this logger's explicit level. Invalidates the effective-level
    /// cache of every logger in the tree (epoch bump).
    pub fn set_level(&self, level: Level) {
        self.level.store(level.value(), Ordering::Relaxed);
        self.bump_epoch();
    }

    /// Clear this logger's explicit level so it inherits again.
    ///
    /// The root logger must always carry a concrete level so resolution
    /// terminates; clearing it is ignored.
    pub fn clear_level(&self) {
        if self.is_root {
            tracing::warn!("ignoring clear_level on the root logger");
            return;
        }
        self.level.store(Level::NOTSET.value(), Ordering::Relaxed);
        self.bump_epoch();
    }

    pub fn parent(&self) -> Option<Arc<Logger>> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_parent(&self, parent: Option<Arc<Logger>>) {
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = parent;
    }

    /// Whether dispatch continues past this logger toward its ancestors.
    pub fn propagate(&self) -> bool {
        self.propagate.load(Ordering::Relaxed)
    }

    pub fn set_propagate(&self, propagate: bool) {
        self.propagate.store(propagate, Ordering::Relaxed);
    }

    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub fn remove_handler(&self, handler: &Arc<dyn Handler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|h| !Arc::ptr_eq(h, handler));
    }

    pub fn has_handlers(&self) -> bool {
        !self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Snapshot of the current handler list.
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The severity threshold governing this logger's emission decision:
    /// its own level if set, else the first set level walking toward the
    /// root. Cached per logger; the cache is valid only while the shared
    /// epoch is unchanged, so a level change anywhere invalidates in O(1).
    pub fn effective_level(&self) -> Level {
        let epoch = self.epoch.load(Ordering::Acquire);
        if let Some((cached_epoch, level)) =
            *self.cache.read().unwrap_or_else(PoisonError::into_inner)
        {
            if cached_epoch == epoch {
                return level;
            }
        }
        let level = self.resolve_level();
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some((epoch, level));
        level
    }

    fn resolve_level(&self) -> Level {
        if let Some(level) = self.level() {
            return level;
        }
        let mut node = self.parent();
        while let Some(logger) = node {
            if let Some(level) = logger.level() {
                return level;
            }
            node = logger.parent();
        }
        // Unreachable in a well-formed tree: the root is never NOTSET
        Level::WARNING
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.effective_level()
    }

    /// Emit one record at `level` if this logger's effective level admits
    /// it. The level check runs before the record is constructed, so a
    /// suppressed call never pays for rendering.
    pub fn log(&self, level: Level, message: &str, context: &[(&str, Value)]) {
        if !self.is_enabled_for(level) {
            return;
        }
        let record = Record::new(self.name.clone(), level, message, context);
        self.call_handlers(&record);
    }

    pub fn debug(&self, message: &str, context: &[(&str, Value)]) {
        self.log(Level::DEBUG, message, context);
    }

    pub fn info(&self, message: &str, context: &[(&str, Value)]) {
        self.log(Level::INFO, message, context);
    }

    pub fn warning(&self, message: &str, context: &[(&str, Value)]) {
        self.log(Level::WARNING, message, context);
    }

    pub fn error(&self, message: &str, context: &[(&str, Value)]) {
        self.log(Level::ERROR, message, context);
    }

    pub fn critical(&self, message: &str, context: &[(&str, Value)]) {
        self.log(Level::CRITICAL, message, context);
    }

    /// Dispatch a record: fire this node's admitting handlers, then climb
    /// the ancestor chain doing the same, stopping after a node with
    /// propagation disabled or after the root.
    ///
    /// Ancestor logger levels do not re-gate the record; only each visited
    /// handler's own threshold filters here.
    pub fn call_handlers(&self, record: &Record) {
        self.handle_local(record);
        if !self.propagate() {
            return;
        }
        let mut node = self.parent();
        while let Some(logger) = node {
            logger.handle_local(record);
            if !logger.propagate() {
                return;
            }
            node = logger.parent();
        }
    }

    fn handle_local(&self, record: &Record) {
        // Snapshot under the read lock; dispatch sees either the pre- or
        // post-mutation list, never a partially mutated one
        let handlers = self.handlers();
        for handler in handlers {
            if record.level() >= handler.level() {
                handler.handle(record);
            }
        }
    }

    fn bump_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

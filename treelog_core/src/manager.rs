//! Logger registry and name-tree resolution.
//!
//! The [`Manager`] owns the process-scoped logger tree: a mapping from
//! dotted name to either a real [`Logger`] or a placeholder marking a name
//! referenced only as an ancestor so far. All creation and tree repair runs
//! under one registry lock, so a concurrent reader never observes a
//! half-repointed subtree.

use crate::{Error, Level, Logger, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Reserved name of the root logger. `get_logger(ROOT_NAME)` returns the
/// root; the root is otherwise reached through [`Manager::root`].
pub const ROOT_NAME: &str = "root";

/// Registry entry: a materialized logger, or a marker for a name some
/// descendant referenced before it was explicitly created.
enum Node {
    Logger(Arc<Logger>),
    Placeholder(Placeholder),
}

/// Records the names of real loggers registered below a not-yet-created
/// ancestor, so they can be repointed when it materializes.
#[derive(Default)]
struct Placeholder {
    children: Vec<String>,
}

/// Owner of the logger tree: registry, root logger, and the cache epoch.
///
/// This is an explicit context object rather than ambient global state;
/// each test (or embedding application) can construct an isolated tree.
pub struct Manager {
    registry: Mutex<HashMap<String, Node>>,
    root: Arc<Logger>,
    epoch: Arc<AtomicU64>,
}

impl Manager {
    /// Create a manager with a fresh root logger. The root always has a
    /// concrete level so effective-level resolution terminates.
    pub fn new(root_level: Level) -> Self {
        let epoch = Arc::new(AtomicU64::new(0));
        let root = Logger::new_root(ROOT_NAME.to_string(), root_level, epoch.clone());
        Self {
            registry: Mutex::new(HashMap::new()),
            root,
            epoch,
        }
    }

    /// The unique top-of-tree logger.
    pub fn root(&self) -> Arc<Logger> {
        self.root.clone()
    }

    /// Return the logger registered under `name`, creating it (and
    /// placeholder entries for its missing ancestors) on first request.
    ///
    /// Names are dotted, with the separator as the only structural
    /// delimiter; empty names and empty segments are configuration errors.
    /// The reserved name `"root"` returns the root logger.
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>> {
        if name == ROOT_NAME {
            return Ok(self.root());
        }
        validate_name(name)?;

        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(Node::Logger(logger)) = registry.get(name) {
            return Ok(logger.clone());
        }

        let logger = Logger::new(name.to_string(), self.epoch.clone());
        let previous = registry.insert(name.to_string(), Node::Logger(logger.clone()));
        if let Some(Node::Placeholder(placeholder)) = previous {
            // This name was referenced as an ancestor before being created:
            // graft the new node between its children and their old parents
            self.fixup_children(&registry, &placeholder, &logger);
        }
        self.fixup_parents(&mut registry, &logger);

        // Descendants resolved through a more distant ancestor until now
        self.epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!("Created logger `{}`", logger.name());
        Ok(logger)
    }

    /// Point `logger` at its nearest real ancestor (or the root), inserting
    /// placeholder entries for every missing intermediate name.
    fn fixup_parents(&self, registry: &mut HashMap<String, Node>, logger: &Arc<Logger>) {
        let name = logger.name();
        let mut parent: Option<Arc<Logger>> = None;
        let mut index = name.len();

        while let Some(dot) = name[..index].rfind('.') {
            let prefix = &name[..dot];
            index = dot;
            match registry.entry(prefix.to_string()) {
                Entry::Vacant(entry) => {
                    entry.insert(Node::Placeholder(Placeholder {
                        children: vec![name.to_string()],
                    }));
                }
                Entry::Occupied(mut entry) => match entry.get_mut() {
                    Node::Placeholder(placeholder) => {
                        if !placeholder.children.iter().any(|child| child == name) {
                            placeholder.children.push(name.to_string());
                        }
                    }
                    Node::Logger(ancestor) => {
                        parent = Some(ancestor.clone());
                        break;
                    }
                },
            }
        }

        logger.set_parent(Some(parent.unwrap_or_else(|| self.root.clone())));
    }

    /// Repoint the children recorded on a placeholder at the logger that
    /// just materialized under the placeholder's name. Only children whose
    /// current parent sits above the new node move; deeper intermediates
    /// keep their closer parents.
    fn fixup_children(
        &self,
        registry: &HashMap<String, Node>,
        placeholder: &Placeholder,
        logger: &Arc<Logger>,
    ) {
        let name = logger.name();
        for child_name in &placeholder.children {
            let Some(Node::Logger(child)) = registry.get(child_name) else {
                continue;
            };
            let Some(old_parent) = child.parent() else {
                continue;
            };
            if !is_below(old_parent.name(), name) {
                child.set_parent(Some(logger.clone()));
            }
        }
    }
}

/// Whether `name` equals `ancestor` or sits underneath it in the tree.
fn is_below(name: &str, ancestor: &str) -> bool {
    name == ancestor
        || (name.len() > ancestor.len()
            && name.starts_with(ancestor)
            && name.as_bytes()[ancestor.len()] == b'.')
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config("logger name must not be empty".into()));
    }
    if name.split('.').any(|segment| segment.is_empty()) {
        return Err(Error::Config(format!(
            "logger name `{}` contains an empty segment",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_same_name_returns_same_logger() {
        let manager = Manager::new(Level::WARNING);
        let first = manager.get_logger("app.db").unwrap();
        let second = manager.get_logger("app.db").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_root_reserved_name() {
        let manager = Manager::new(Level::WARNING);
        let root = manager.get_logger(ROOT_NAME).unwrap();
        assert!(Arc::ptr_eq(&root, &manager.root()));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let manager = Manager::new(Level::WARNING);
        assert!(manager.get_logger("").is_err());
        assert!(manager.get_logger(".app").is_err());
        assert!(manager.get_logger("app.").is_err());
        assert!(manager.get_logger("app..db").is_err());
    }

    #[test]
    fn test_parent_defaults_to_root() {
        let manager = Manager::new(Level::WARNING);
        let app = manager.get_logger("app").unwrap();
        let parent = app.parent().unwrap();
        assert_eq!(parent.name(), ROOT_NAME);
    }

    #[test]
    fn test_parent_is_nearest_real_ancestor() {
        let manager = Manager::new(Level::WARNING);
        let app = manager.get_logger("app").unwrap();
        let pool = manager.get_logger("app.db.pool").unwrap();

        // "app.db" is only a placeholder, so the chain skips to "app"
        assert!(Arc::ptr_eq(&pool.parent().unwrap(), &app));
    }

    #[test]
    fn test_out_of_order_creation_repoints_children() {
        let manager = Manager::new(Level::WARNING);
        let pool = manager.get_logger("app.db.pool").unwrap();
        assert_eq!(pool.parent().unwrap().name(), ROOT_NAME);

        let db = manager.get_logger("app.db").unwrap();
        assert!(Arc::ptr_eq(&pool.parent().unwrap(), &db));

        // Observable consequence: a level set on the late-created ancestor
        // now governs the earlier child
        db.set_level(Level::DEBUG);
        assert_eq!(pool.effective_level(), Level::DEBUG);
    }

    #[test]
    fn test_repair_keeps_closer_intermediates() {
        let manager = Manager::new(Level::WARNING);
        let deep = manager.get_logger("a.b.c.d").unwrap();
        let abc = manager.get_logger("a.b.c").unwrap();
        assert!(Arc::ptr_eq(&deep.parent().unwrap(), &abc));

        // Materializing "a.b" must not steal "a.b.c.d" from "a.b.c"
        let ab = manager.get_logger("a.b").unwrap();
        assert!(Arc::ptr_eq(&deep.parent().unwrap(), &abc));
        assert!(Arc::ptr_eq(&abc.parent().unwrap(), &ab));
    }

    #[test]
    fn test_concurrent_get_logger_keeps_tree_consistent() {
        let manager = Arc::new(Manager::new(Level::WARNING));
        let names = [
            "app",
            "app.db",
            "app.db.pool",
            "app.db.tx",
            "app.http",
            "app.http.server",
        ];

        let mut threads = Vec::new();
        for offset in 0..8 {
            let manager = manager.clone();
            threads.push(thread::spawn(move || {
                for i in 0..50 {
                    let name = names[(i + offset) % names.len()];
                    manager.get_logger(name).unwrap();
                }
            }));
        }
        for t in threads {
            t.join().unwrap();
        }

        // Every parent reference resolves to a registered real logger
        let app = manager.get_logger("app").unwrap();
        let db = manager.get_logger("app.db").unwrap();
        let http = manager.get_logger("app.http").unwrap();
        assert!(Arc::ptr_eq(
            &manager.get_logger("app.db.pool").unwrap().parent().unwrap(),
            &db
        ));
        assert!(Arc::ptr_eq(
            &manager.get_logger("app.db.tx").unwrap().parent().unwrap(),
            &db
        ));
        assert!(Arc::ptr_eq(
            &manager
                .get_logger("app.http.server")
                .unwrap()
                .parent()
                .unwrap(),
            &http
        ));
        assert!(Arc::ptr_eq(&db.parent().unwrap(), &app));
        assert_eq!(app.parent().unwrap().name(), ROOT_NAME);
    }
}

//! Module exports container
//!
//! A module's exports are created empty when its record is registered and
//! populated in place while the module is constructed. The handle is shared:
//! every requester receives the same table, including a partially populated
//! one when the target is still being built.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::module::traits::HostEnvironment;

/// Export key holding the server module's message handler
pub const MESSAGE_HANDLER_KEY: &str = "onmessage";

/// Export key receiving the name supplied in the init message
pub const NAME_KEY: &str = "name";

/// Application-level message handler installed after bootstrap
pub type MessageHandler = Rc<dyn Fn(&mut dyn HostEnvironment, Value) -> anyhow::Result<()>>;

/// A single exported item
#[derive(Clone)]
pub enum Export {
    /// Plain data
    Value(Value),
    /// Message handling function
    Handler(MessageHandler),
    /// Another module's exports, re-exported by reference
    Module(Exports),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Export::Handler(_) => f.write_str("Handler(..)"),
            Export::Module(m) => write!(f, "Module({} keys)", m.len()),
        }
    }
}

/// Shared, mutable exports table
#[derive(Clone, Default)]
pub struct Exports {
    table: Rc<RefCell<HashMap<String, Export>>>,
}

impl Exports {
    /// Create an empty exports table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an export, replacing any previous value under `key`
    pub fn set(&self, key: impl Into<String>, export: Export) {
        self.table.borrow_mut().insert(key.into(), export);
    }

    /// Set a plain data export
    pub fn set_value(&self, key: impl Into<String>, value: Value) {
        self.set(key, Export::Value(value));
    }

    /// Set a function export
    pub fn set_handler<F>(&self, key: impl Into<String>, handler: F)
    where
        F: Fn(&mut dyn HostEnvironment, Value) -> anyhow::Result<()> + 'static,
    {
        self.set(key, Export::Handler(Rc::new(handler)));
    }

    /// Get an export by key
    pub fn get(&self, key: &str) -> Option<Export> {
        self.table.borrow().get(key).cloned()
    }

    /// Get a plain data export by key
    pub fn value(&self, key: &str) -> Option<Value> {
        match self.get(key)? {
            Export::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Get a function export by key
    pub fn handler(&self, key: &str) -> Option<MessageHandler> {
        match self.get(key)? {
            Export::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Get a re-exported module by key
    pub fn module(&self, key: &str) -> Option<Exports> {
        match self.get(key)? {
            Export::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }

    /// Sorted export keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.table.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// True if both handles refer to the same table
    pub fn ptr_eq(a: &Exports, b: &Exports) -> bool {
        Rc::ptr_eq(&a.table, &b.table)
    }
}

impl fmt::Debug for Exports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exports").field("keys", &self.keys()).finish()
    }
}

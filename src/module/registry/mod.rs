//! Module registry
//!
//! Single point of truth for "is this id known" and "is it loaded". Records
//! are keyed by canonical id, created once and never removed for the life of
//! the worker context.

pub mod dependencies;
pub mod exports;
pub mod manifest;
pub mod record;

pub use dependencies::{BuildReport, DependencyBuilder, Require};
pub use exports::{Export, Exports, MessageHandler, MESSAGE_HANDLER_KEY, NAME_KEY};
pub use manifest::ModuleDescriptor;
pub use record::{build_fn, BuildFn, ModuleRecord};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

use crate::module::loader::DefineScope;
use crate::module::resolver;
use crate::module::traits::{HostEnvironment, ModuleError};

/// Mapping from canonical module id to its record
#[derive(Debug, Default)]
pub struct Registry {
    modules: RefCell<HashMap<String, Rc<ModuleRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch of descriptors and load their sources
    ///
    /// All records are created before any source is loaded, so a script may
    /// define any module of the batch. Records are returned in descriptor
    /// order. A failing source aborts registration.
    pub fn register<H>(
        &self,
        descriptors: &[ModuleDescriptor],
        host: &mut H,
    ) -> Result<Vec<Rc<ModuleRecord>>, ModuleError>
    where
        H: HostEnvironment + ?Sized,
    {
        let mut records = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            descriptor.validate()?;
            let record = Rc::new(ModuleRecord::from_descriptor(descriptor));
            self.insert(Rc::clone(&record))?;
            debug!("Registered module {} ({})", record.id(), record.url());
            records.push(record);
        }

        let scope = DefineScope::new(self);
        for record in &records {
            let script = host.load_source(record.url())?;
            script(&scope)?;
        }

        Ok(records)
    }

    /// Register a module that is already built
    pub fn register_builtin(
        &self,
        id: impl Into<String>,
        exports: Exports,
    ) -> Result<Rc<ModuleRecord>, ModuleError> {
        let record = Rc::new(ModuleRecord::prebuilt(id, exports));
        self.insert(Rc::clone(&record))?;
        debug!("Registered built-in module {}", record.id());
        Ok(record)
    }

    fn insert(&self, record: Rc<ModuleRecord>) -> Result<(), ModuleError> {
        let mut modules = self.modules.borrow_mut();
        if modules.contains_key(record.id()) {
            return Err(ModuleError::DuplicateModule(record.id().to_string()));
        }
        modules.insert(record.id().to_string(), record);
        Ok(())
    }

    /// Attach a construction routine to a registered module
    pub fn define<F>(&self, id: &str, build: F) -> Result<(), ModuleError>
    where
        F: Fn(&Require, &Exports, &ModuleRecord) -> Result<(), ModuleError> + 'static,
    {
        self.define_fn(id, build_fn(build))
    }

    /// Attach a shared construction routine to a registered module
    pub fn define_fn(&self, id: &str, build: BuildFn) -> Result<(), ModuleError> {
        let record = self
            .get(id)
            .ok_or_else(|| ModuleError::InvalidDefine(id.to_string()))?;
        record.define(build)?;
        debug!("Defined module {}", id);
        Ok(())
    }

    /// Get a record by canonical id
    pub fn get(&self, key: &str) -> Option<Rc<ModuleRecord>> {
        self.modules.borrow().get(key).cloned()
    }

    /// Resolve `id` as referenced from `requester` and get its record
    pub fn lookup(&self, id: &str, requester: &str) -> Option<Rc<ModuleRecord>> {
        self.get(&resolver::resolve(id, requester))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.modules.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.modules.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.borrow().is_empty()
    }

    /// Sorted list of registered ids
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modules.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }
}

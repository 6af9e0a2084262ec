//! Module record
//!
//! The registry's unit of tracked state for one code unit.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::module::registry::dependencies::Require;
use crate::module::registry::exports::Exports;
use crate::module::registry::manifest::ModuleDescriptor;
use crate::module::traits::{LoadState, ModuleError};

/// Deferred construction routine of a module
///
/// Called at most once with a require function bound to the module's own id,
/// the module's exports table, and the record itself.
pub type BuildFn = Rc<dyn Fn(&Require, &Exports, &ModuleRecord) -> Result<(), ModuleError>>;

/// Wrap a closure as a [`BuildFn`]
pub fn build_fn<F>(f: F) -> BuildFn
where
    F: Fn(&Require, &Exports, &ModuleRecord) -> Result<(), ModuleError> + 'static,
{
    Rc::new(f)
}

enum ModuleState {
    Registered,
    Pending(BuildFn),
    Building,
    Loaded,
}

impl ModuleState {
    fn kind(&self) -> LoadState {
        match self {
            ModuleState::Registered => LoadState::Registered,
            ModuleState::Pending(_) => LoadState::Pending,
            ModuleState::Building => LoadState::Building,
            ModuleState::Loaded => LoadState::Loaded,
        }
    }
}

/// Tracked state for one module
pub struct ModuleRecord {
    id: String,
    url: String,
    exports: Exports,
    children: Vec<String>,
    state: RefCell<ModuleState>,
}

impl ModuleRecord {
    /// Record for a descriptor from the init batch
    pub(crate) fn from_descriptor(descriptor: &ModuleDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            url: descriptor.url.clone(),
            exports: Exports::new(),
            children: descriptor.children.clone(),
            state: RefCell::new(ModuleState::Registered),
        }
    }

    /// Record that is loaded from the start and has nothing to build
    pub(crate) fn prebuilt(id: impl Into<String>, exports: Exports) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            exports,
            children: Vec::new(),
            state: RefCell::new(ModuleState::Loaded),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opaque source locator
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    /// Dependency identifiers as written by the module author (unresolved)
    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().kind()
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    /// True while a construction routine is waiting to run
    pub fn has_build_fn(&self) -> bool {
        self.state() == LoadState::Pending
    }

    /// Attach a construction routine
    ///
    /// Only a record that has not started building accepts one; a later
    /// define replaces an earlier one.
    pub(crate) fn define(&self, build: BuildFn) -> Result<(), ModuleError> {
        let mut state = self.state.borrow_mut();
        match *state {
            ModuleState::Registered | ModuleState::Pending(_) => {
                *state = ModuleState::Pending(build);
                Ok(())
            }
            ModuleState::Building | ModuleState::Loaded => {
                Err(ModuleError::InvalidDefine(self.id.clone()))
            }
        }
    }

    /// Take the routine out and mark the record as building
    ///
    /// Returns `None` when there is nothing to build; the state is left as is.
    pub(crate) fn begin_build(&self) -> Option<BuildFn> {
        let mut state = self.state.borrow_mut();
        match mem::replace(&mut *state, ModuleState::Building) {
            ModuleState::Pending(build) => Some(build),
            other => {
                *state = other;
                None
            }
        }
    }

    pub(crate) fn finish_build(&self) {
        *self.state.borrow_mut() = ModuleState::Loaded;
    }
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("children", &self.children)
            .field("state", &self.state())
            .finish()
    }
}

//! Module dependency building
//!
//! Builds a batch of registered modules in an order that respects their
//! declared dependencies, and force-builds whatever is left once only cycles
//! remain. Module bodies may pull in other modules on demand through
//! [`Require`]; a module that is still building hands out its partially
//! populated exports instead of being entered twice.

use std::rc::Rc;
use tracing::{debug, warn};

use crate::module::registry::exports::Exports;
use crate::module::registry::record::ModuleRecord;
use crate::module::registry::Registry;
use crate::module::traits::ModuleError;

/// Build result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Full scans over the pending list
    pub passes: usize,
    /// Modules taken off the pending list because their dependencies were ready
    pub ordered: Vec<String>,
    /// Modules force-built after ordering converged (cyclic or unresolvable)
    pub forced: Vec<String>,
}

impl BuildReport {
    pub fn has_cycles(&self) -> bool {
        !self.forced.is_empty()
    }
}

/// Require function handed to module bodies, bound to the requesting module
#[derive(Clone)]
pub struct Require {
    registry: Rc<Registry>,
    requester: Rc<str>,
}

impl Require {
    pub(crate) fn new(registry: Rc<Registry>, requester: &str) -> Self {
        Self {
            registry,
            requester: Rc::from(requester),
        }
    }

    /// Id of the module this require function resolves from
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Resolve `id` relative to the requester and return its exports
    ///
    /// A module whose routine has not run yet is built in place first. A
    /// module that is mid-construction returns its current exports.
    pub fn require(&self, id: &str) -> Result<Exports, ModuleError> {
        let record = self
            .registry
            .lookup(id, &self.requester)
            .ok_or_else(|| ModuleError::UnresolvedRequire {
                id: id.to_string(),
                from: self.requester.to_string(),
            })?;
        run_build(&self.registry, &record)?;
        Ok(record.exports().clone())
    }
}

// Runs the record's routine if it has one. The routine is taken out before
// it executes, so reentrant requests for this record see nothing to build.
fn run_build(registry: &Rc<Registry>, record: &ModuleRecord) -> Result<bool, ModuleError> {
    let Some(build) = record.begin_build() else {
        return Ok(false);
    };
    let require = Require::new(Rc::clone(registry), record.id());
    build(&require, record.exports(), record)?;
    record.finish_build();
    debug!("Built module {}", record.id());
    Ok(true)
}

/// Dependency-ordered builder over one registry
pub struct DependencyBuilder {
    registry: Rc<Registry>,
    debug: bool,
}

impl DependencyBuilder {
    pub fn new(registry: Rc<Registry>) -> Self {
        Self {
            registry,
            debug: false,
        }
    }

    /// Report cyclic groups before force-building them
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build every pending record exactly once
    ///
    /// Records whose dependencies are all loaded are built and swapped out of
    /// the list; among records ready in the same pass the construction order
    /// is unspecified. When a pass removes nothing, the remaining records are
    /// built unconditionally.
    pub fn build(&self, mut pending: Vec<Rc<ModuleRecord>>) -> Result<BuildReport, ModuleError> {
        let mut report = BuildReport::default();

        loop {
            let before = pending.len();
            report.passes += 1;

            let mut i = pending.len();
            while i > 0 {
                i -= 1;
                if !self.dependencies_ready(&pending[i]) {
                    continue;
                }
                self.build_one(&pending[i])?;
                let record = pending.swap_remove(i);
                report.ordered.push(record.id().to_string());
            }

            if pending.len() == before {
                break;
            }
        }

        if !pending.is_empty() && self.debug {
            let ids: Vec<&str> = pending.iter().map(|r| r.id()).collect();
            warn!("cycle depend modules, forcing construction: {:?}", ids);
        }

        for record in pending.iter().rev() {
            self.build_one(record)?;
            report.forced.push(record.id().to_string());
        }

        debug!(
            "Build complete after {} passes: {} ordered, {} forced",
            report.passes,
            report.ordered.len(),
            report.forced.len()
        );
        Ok(report)
    }

    /// Construct one record
    ///
    /// A record without a routine is accepted only if it is already loaded.
    pub fn build_one(&self, record: &ModuleRecord) -> Result<(), ModuleError> {
        if run_build(&self.registry, record)? || record.is_loaded() {
            Ok(())
        } else {
            Err(ModuleError::MalformedModule(record.id().to_string()))
        }
    }

    /// True if every child resolves to a loaded record
    ///
    /// An unresolvable child only means "not ready" here.
    pub fn dependencies_ready(&self, record: &ModuleRecord) -> bool {
        record.children().iter().all(|child| {
            self.registry
                .lookup(child, record.id())
                .is_some_and(|dep| dep.is_loaded())
        })
    }

    /// Require function bound to `requester`
    pub fn require_from(&self, requester: &str) -> Require {
        Require::new(Rc::clone(&self.registry), requester)
    }
}

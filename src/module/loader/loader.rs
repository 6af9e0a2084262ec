//! Script map and define scope
//!
//! Handles source lookup by url and attaching construction routines to
//! registered modules.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use crate::module::registry::{build_fn, BuildFn, Exports, ModuleRecord, Registry, Require};
use crate::module::traits::ModuleError;

/// Loaded source: defines modules when run
pub type Script = Rc<dyn Fn(&DefineScope<'_>) -> Result<(), ModuleError>>;

/// Wrap a closure as a [`Script`]
pub fn script<F>(f: F) -> Script
where
    F: Fn(&DefineScope<'_>) -> Result<(), ModuleError> + 'static,
{
    Rc::new(f)
}

/// Scope a script runs in, bound to the registry being populated
pub struct DefineScope<'a> {
    registry: &'a Registry,
}

impl<'a> DefineScope<'a> {
    pub(crate) fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Define the construction routine of the registered module `id`
    pub fn define<F>(&self, id: &str, build: F) -> Result<(), ModuleError>
    where
        F: Fn(&Require, &Exports, &ModuleRecord) -> Result<(), ModuleError> + 'static,
    {
        self.registry.define(id, build)
    }

    /// Define with an already shared routine
    pub fn define_fn(&self, id: &str, build: BuildFn) -> Result<(), ModuleError> {
        self.registry.define_fn(id, build)
    }
}

/// In-memory scripts keyed by url
#[derive(Clone, Default)]
pub struct ScriptMap {
    scripts: HashMap<String, Script>,
}

impl ScriptMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a script under `url`, replacing any previous one
    pub fn import_script<F>(&mut self, url: impl Into<String>, f: F) -> String
    where
        F: Fn(&DefineScope<'_>) -> Result<(), ModuleError> + 'static,
    {
        let url = url.into();
        debug!("Imported script {}", url);
        self.scripts.insert(url.clone(), script(f));
        url
    }

    /// Store a script under `url` that defines the single module `id`
    pub fn define_module<F>(&mut self, url: impl Into<String>, id: impl Into<String>, build: F) -> String
    where
        F: Fn(&Require, &Exports, &ModuleRecord) -> Result<(), ModuleError> + 'static,
    {
        let id = id.into();
        let build = build_fn(build);
        self.import_script(url, move |scope| scope.define_fn(&id, Rc::clone(&build)))
    }

    pub fn get(&self, url: &str) -> Option<Script> {
        self.scripts.get(url).cloned()
    }

    /// Fetch the script for `url`
    pub fn load(&self, url: &str) -> Result<Script, ModuleError> {
        self.get(url).ok_or_else(|| ModuleError::SourceLoadFailure {
            url: url.to_string(),
            reason: "no script imported for url".to_string(),
        })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.scripts.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl fmt::Debug for ScriptMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut urls: Vec<&String> = self.scripts.keys().collect();
        urls.sort();
        f.debug_struct("ScriptMap").field("urls", &urls).finish()
    }
}

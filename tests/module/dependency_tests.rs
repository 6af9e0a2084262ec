//! Dependency building tests
//!
//! Ordering, forced construction of cycles, partial exports through require
//! cycles, and termination bounds.

use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::test_utils::*;
use worker_runtime::module::registry::{
    DependencyBuilder, Exports, ModuleDescriptor, ModuleRecord, Registry,
};
use worker_runtime::{LoadState, ScriptHost, ScriptMap};

fn register(scripts: ScriptMap, descriptors: &[ModuleDescriptor]) -> (Rc<Registry>, Vec<Rc<ModuleRecord>>) {
    let registry = Rc::new(Registry::new());
    let mut host = ScriptHost::new(scripts);
    let records = registry.register(descriptors, &mut host).unwrap();
    (registry, records)
}

#[test]
fn test_mutual_cycle_builds_both_once() {
    let calls = Rc::new(Cell::new(0));
    let mut scripts = ScriptMap::new();
    for (url, id) in [("a.js", "/app/a"), ("b.js", "/app/b")] {
        let calls = Rc::clone(&calls);
        scripts.define_module(url, id, move |_, exports, me| {
            calls.set(calls.get() + 1);
            exports.set_value("id", json!(me.id()));
            Ok(())
        });
    }
    let (registry, records) = register(
        scripts,
        &[
            ModuleDescriptor::new("/app/a", "a.js").with_children(["./b"]),
            ModuleDescriptor::new("/app/b", "b.js").with_children(["./a"]),
        ],
    );

    let report = DependencyBuilder::new(registry)
        .with_debug(true)
        .build(records.clone())
        .unwrap();

    assert!(report.has_cycles());
    assert!(report.passes <= records.len() + 1);
    assert!(report.ordered.is_empty());
    assert_eq!(report.forced.len(), 2);
    assert_eq!(calls.get(), 2);
    assert!(records.iter().all(|r| r.state() == LoadState::Loaded));
}

#[test]
fn test_require_cycle_sees_partial_exports() {
    let seen_by_a: Rc<RefCell<Option<Exports>>> = Rc::new(RefCell::new(None));
    let partial_keys = Rc::new(RefCell::new(Vec::new()));

    let mut scripts = ScriptMap::new();
    {
        let seen_by_a = Rc::clone(&seen_by_a);
        let partial_keys = Rc::clone(&partial_keys);
        scripts.define_module("a.js", "/app/a", move |require, exports, _| {
            let b = require.require("./b")?;
            *partial_keys.borrow_mut() = b.keys();
            *seen_by_a.borrow_mut() = Some(b);
            exports.set_value("done", json!(true));
            Ok(())
        });
    }
    scripts.define_module("b.js", "/app/b", |require, exports, _| {
        exports.set_value("early", json!(1));
        let a = require.require("./a")?;
        exports.set_value("late", json!(a.value("done").is_some()));
        Ok(())
    });
    let (registry, records) = register(
        scripts,
        &[
            ModuleDescriptor::new("/app/a", "a.js").with_children(["./b"]),
            ModuleDescriptor::new("/app/b", "b.js").with_children(["./a"]),
        ],
    );

    // Forced construction starts with /app/b, which pulls in /app/a, which
    // requires /app/b back while it is still building
    DependencyBuilder::new(registry).build(records.clone()).unwrap();

    assert_eq!(*partial_keys.borrow(), vec!["early"]);
    let seen = seen_by_a.borrow().clone().unwrap();
    assert!(Exports::ptr_eq(&seen, records[1].exports()));
    assert_eq!(seen.value("late"), Some(json!(true)));
}

#[test]
fn test_routine_runs_once_when_required_repeatedly() {
    let calls = Rc::new(Cell::new(0));
    let mut fixture = ModuleTestFixture::new();
    let received: Rc<RefCell<Vec<Exports>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let calls = Rc::clone(&calls);
        fixture.scripts.define_module("shared.js", "/lib/shared", move |_, _, _| {
            calls.set(calls.get() + 1);
            Ok(())
        });
    }
    for (url, id) in [("x.js", "/app/x"), ("y.js", "/app/y")] {
        let received = Rc::clone(&received);
        fixture.scripts.define_module(url, id, move |require, _, _| {
            let absolute = require.require("/lib/shared")?;
            let relative = require.require("../lib/shared")?;
            received.borrow_mut().extend([absolute, relative]);
            Ok(())
        });
    }
    let (registry, records) = register(
        fixture.scripts.clone(),
        &[
            ModuleDescriptor::new("/app/x", "x.js"),
            ModuleDescriptor::new("/app/y", "y.js"),
            ModuleDescriptor::new("/lib/shared", "shared.js"),
        ],
    );

    DependencyBuilder::new(Rc::clone(&registry)).build(records).unwrap();
    assert_eq!(calls.get(), 1);

    let shared = registry.get("/lib/shared").unwrap();
    let received = received.borrow();
    assert_eq!(received.len(), 4);
    assert!(received
        .iter()
        .all(|exports| Exports::ptr_eq(exports, shared.exports())));
}

#[test]
fn test_three_module_cycle_shares_exports() {
    let calls = Rc::new(Cell::new(0));
    let mut scripts = ScriptMap::new();
    for (url, id, next) in [
        ("a.js", "/m/a", "/m/b"),
        ("b.js", "/m/b", "/m/c"),
        ("c.js", "/m/c", "/m/a"),
    ] {
        let calls = Rc::clone(&calls);
        scripts.define_module(url, id, move |require, exports, _| {
            calls.set(calls.get() + 1);
            exports.set("next", worker_runtime::module::registry::Export::Module(require.require(next)?));
            Ok(())
        });
    }
    let (registry, records) = register(
        scripts,
        &[
            ModuleDescriptor::new("/m/a", "a.js").with_children(["./b"]),
            ModuleDescriptor::new("/m/b", "b.js").with_children(["./c"]),
            ModuleDescriptor::new("/m/c", "c.js").with_children(["./a"]),
        ],
    );

    let builder = DependencyBuilder::new(Rc::clone(&registry));
    let report = builder.build(records.clone()).unwrap();

    assert_eq!(calls.get(), 3);
    assert!(report.passes <= records.len() + 1);
    assert_eq!(report.forced.len(), 3);
    assert!(records.iter().all(|r| r.is_loaded()));

    let a = builder.require_from("/app/outside").require("/m/a").unwrap();
    assert!(Exports::ptr_eq(&a, records[0].exports()));
    let b_next = records[1].exports().module("next").unwrap();
    assert!(Exports::ptr_eq(&b_next, records[2].exports()));
}

#[test]
fn test_required_but_undefined_module_yields_empty_exports() {
    let mut scripts = ScriptMap::new();
    scripts.define_module("main.js", "/app/main", |require, exports, _| {
        let ghost = require.require("./ghost")?;
        exports.set_value("ghost_empty", json!(ghost.is_empty()));
        Ok(())
    });
    scripts.import_script("ghost.js", |_| Ok(()));
    let (registry, _) = register(
        scripts,
        &[
            ModuleDescriptor::new("/app/main", "main.js"),
            ModuleDescriptor::new("/app/ghost", "ghost.js"),
        ],
    );

    let main = registry.get("/app/main").unwrap();
    DependencyBuilder::new(Rc::clone(&registry)).build_one(&main).unwrap();
    assert_eq!(main.exports().value("ghost_empty"), Some(json!(true)));
    assert_eq!(registry.get("/app/ghost").unwrap().state(), LoadState::Registered);
}

#[test]
fn test_unresolvable_child_is_forced() {
    let mut fixture = ModuleTestFixture::new();
    fixture.logged_module("a.js", "/app/a");
    let (registry, records) = register(
        fixture.scripts.clone(),
        &[ModuleDescriptor::new("/app/a", "a.js").with_children(["./not-in-batch"])],
    );

    let report = DependencyBuilder::new(registry).build(records).unwrap();
    assert_eq!(report.forced, vec!["/app/a"]);
    assert_eq!(fixture.built(), vec!["/app/a"]);
}

#[test]
fn test_build_error_propagates() {
    let mut scripts = ScriptMap::new();
    scripts.define_module("a.js", "/app/a", |_, _, _| Err(anyhow::anyhow!("boom").into()));
    let (registry, records) = register(scripts, &[ModuleDescriptor::new("/app/a", "a.js")]);

    let err = DependencyBuilder::new(registry).build(records).unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

fn module_id(i: usize) -> String {
    format!("/m/{}", i)
}

// Module i depends on a few modules with lower index, so the graph is acyclic
fn acyclic_batch() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..10).prop_flat_map(|n| {
        let deps = proptest::collection::vec(proptest::collection::vec(any::<Index>(), 0..3), n);
        let order = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        (deps, order).prop_map(|(picks, order)| {
            let deps = picks
                .iter()
                .enumerate()
                .map(|(i, picks)| {
                    if i == 0 {
                        Vec::new()
                    } else {
                        picks.iter().map(|p| p.index(i)).collect()
                    }
                })
                .collect();
            (deps, order)
        })
    })
}

proptest! {
    #[test]
    fn prop_acyclic_batches_build_in_dependency_order((deps, order) in acyclic_batch()) {
        let n = deps.len();
        let log: BuildLog = Rc::new(RefCell::new(Vec::new()));
        let mut scripts = ScriptMap::new();
        for i in 0..n {
            let log = Rc::clone(&log);
            scripts.define_module(format!("{}.js", i), module_id(i), move |_, _, me| {
                log.borrow_mut().push(me.id().to_string());
                Ok(())
            });
        }
        let descriptors: Vec<ModuleDescriptor> = order
            .iter()
            .map(|&i| {
                ModuleDescriptor::new(module_id(i), format!("{}.js", i))
                    .with_children(deps[i].iter().map(|&d| module_id(d)))
            })
            .collect();
        let (registry, records) = register(scripts, &descriptors);

        let report = DependencyBuilder::new(registry).build(records).unwrap();

        prop_assert!(!report.has_cycles());
        prop_assert!(report.passes <= n + 1);
        let built = log.borrow().clone();
        prop_assert_eq!(built.len(), n);
        for (i, deps) in deps.iter().enumerate() {
            let at = built.iter().position(|id| *id == module_id(i)).unwrap();
            for &d in deps {
                let dep_at = built.iter().position(|id| *id == module_id(d)).unwrap();
                prop_assert!(dep_at < at);
            }
        }
    }
}

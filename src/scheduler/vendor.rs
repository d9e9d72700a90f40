// SPDX-License-Identifier: MIT

//! `build_vendor_modules`: the incremental vendor module scheduler.
//!
//! Vendor modules are processed outside-in: a module is ready once every
//! dependent module has been processed, except dependents in the same
//! circular group, which become ready together. For each ready module the
//! scheduler compares the bindings consumed from it (and its externals list)
//! against the previous run:
//!
//! * unchanged: the previous snapshot is carried forward, no build happens;
//! * no bindings left: the module is dropped from the manifest;
//! * changed: the module is rebuilt through the `build-vendor-module` hook.
//!
//! Rebuilds of one pass run concurrently and the pass is joined before the
//! next readiness sweep. A circular group rebuilds as a unit, iterating
//! until the binding set of every member stops changing.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::context::{BuildContext, BuildState};
use crate::errors::PackError;
use crate::observability::messages::scheduler::{
    CircleConverging, ModuleRemoved, ModuleUnchanged, WaveDispatched,
};
use crate::observability::StructuredLog;
use crate::processor::{action_fn, series, HookArgs, HookType, Task, TaskOptions, TaskRunner};
use crate::project::PkgGraph;
use crate::scheduler::circle::{find_circles, Circle};
use crate::scheduler::graph::VendorGraph;
use crate::tasks::local::build_local_modules;

/// Full vendor stage. Includes the local stage, whose recorded imports are
/// what the binding diffs below are computed from.
pub fn build_vendor_modules() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| series(vec![build_local_modules(), vendor_stage()])))
}

fn vendor_stage() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(
            TaskOptions::new(
                "build-vendor-modules",
                action_fn(|task, runner| async move { schedule(task, runner).await }),
            )
            .with_hooks(&["build-vendor-module"]),
        )
    }))
}

enum WaveItem {
    Single(usize),
    Group { circle: usize, members: Vec<usize> },
}

async fn schedule(task: Arc<Task>, runner: Arc<TaskRunner>) -> Result<(), PackError> {
    let context = Arc::clone(runner.context());
    let pkgs = context.pkgs()?;

    let graph = {
        let mut state = context.state.lock().await;
        VendorGraph::build(pkgs, &mut state)?
    };
    let circles: Arc<Vec<Circle>> = Arc::new(find_circles(&graph));
    let graph = Arc::new(graph);
    let circle_of: HashMap<usize, usize> = circles
        .iter()
        .enumerate()
        .flat_map(|(ci, members)| members.iter().map(move |&node| (node, ci)))
        .collect();

    let mut pending: Vec<usize> = (0..graph.nodes.len()).collect();
    // Readiness is monotonic: once a node is ready it stays ready, so the
    // memo is only ever updated from false to true.
    let mut ready: HashMap<usize, bool> = HashMap::new();
    let mut pass = 0usize;

    while !pending.is_empty() {
        pass += 1;
        let pending_set: HashSet<usize> = pending.iter().copied().collect();
        for &node in &pending {
            if ready.get(&node).copied().unwrap_or(false) {
                continue;
            }
            let is_ready = graph.nodes[node].dependents.iter().all(|dependent| {
                !pending_set.contains(dependent)
                    || circle_of.get(&node).is_some_and(|ci| circle_of.get(dependent) == Some(ci))
            });
            ready.insert(node, is_ready);
        }

        let mut wave: Vec<WaveItem> = Vec::new();
        let mut progressed = false;
        {
            let mut state = context.state.lock().await;
            for &node in &pending.clone() {
                if !ready.get(&node).copied().unwrap_or(false) {
                    continue;
                }
                let circle = circle_of.get(&node).copied();
                // Circles are processed only once every member is ready.
                if let Some(ci) = circle {
                    if !circles[ci].iter().all(|m| ready.get(m).copied().unwrap_or(false)) {
                        continue;
                    }
                }
                pending.retain(|&p| p != node);
                progressed = true;

                let id = graph.nodes[node].id.clone();
                let bindings = current_bindings(&state, pkgs, &id);
                state.bindings_cur.insert(id.clone(), bindings.clone());

                let bindings_changed = state.bindings_pre.get(&id) != Some(&bindings);
                let externals_changed = {
                    let pre = state.pre.find(&id).map(|m| &m.externals);
                    let cur = state.cur.find(&id).map(|m| &m.externals);
                    pre != cur
                };

                if !bindings_changed && !externals_changed {
                    carry_forward(&mut state, pkgs, &id)?;
                    ModuleUnchanged { module: &id }.log();
                } else if bindings.is_empty() {
                    state.remove(&id);
                    ModuleRemoved { module: &id }.log();
                } else {
                    match circle {
                        Some(ci) => {
                            let mut placed = false;
                            for item in wave.iter_mut() {
                                if let WaveItem::Group { circle, members } = item {
                                    if *circle == ci {
                                        members.push(node);
                                        placed = true;
                                        break;
                                    }
                                }
                            }
                            if !placed {
                                wave.push(WaveItem::Group {
                                    circle: ci,
                                    members: vec![node],
                                });
                            }
                        }
                        None => wave.push(WaveItem::Single(node)),
                    }
                }
            }
        }

        if !progressed {
            let stuck: Vec<&str> = pending
                .iter()
                .map(|&node| graph.nodes[node].id.as_str())
                .collect();
            return Err(PackError::graph_invariant(format!(
                "no vendor module can become ready, stuck on: {}",
                stuck.join(", ")
            )));
        }
        if wave.is_empty() {
            continue;
        }

        let dispatched: Vec<String> = wave
            .iter()
            .flat_map(|item| match item {
                WaveItem::Single(node) => vec![graph.nodes[*node].id.clone()],
                WaveItem::Group { members, .. } => members
                    .iter()
                    .map(|&m| graph.nodes[m].id.clone())
                    .collect(),
            })
            .collect();
        WaveDispatched {
            pass,
            modules: &dispatched,
        }
        .log();

        let mut handles = Vec::with_capacity(wave.len());
        for item in wave {
            let task = Arc::clone(&task);
            let context = Arc::clone(&context);
            let graph = Arc::clone(&graph);
            let circles = Arc::clone(&circles);
            handles.push(tokio::spawn(async move {
                match item {
                    WaveItem::Single(node) => build_one(task, context, &graph, node).await,
                    WaveItem::Group { circle, members } => {
                        converge_circle(task, context, &graph, &circles[circle], members).await
                    }
                }
            }));
        }
        for handle in handles {
            match handle.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(PackError::internal(format!(
                        "vendor module build panicked: {err}"
                    )));
                }
            }
        }
    }
    Ok(())
}

async fn build_one(
    task: Arc<Task>,
    context: Arc<BuildContext>,
    graph: &VendorGraph,
    node: usize,
) -> Result<(), PackError> {
    task.call(
        "build-vendor-module",
        HookType::Parallel,
        HookArgs::for_module(&context, graph.nodes[node].id.clone()),
    )
    .await
    .map(|_| ())
}

/// Builds a circular group until every member's binding set is stable.
/// Each round rebuilds the members whose bindings changed in the previous
/// round; a rebuild may re-record imports into other members, so bindings
/// are re-derived for the whole circle after every round.
async fn converge_circle(
    task: Arc<Task>,
    context: Arc<BuildContext>,
    graph: &VendorGraph,
    circle: &[usize],
    mut members: Vec<usize>,
) -> Result<(), PackError> {
    let mut round = 0usize;
    while !members.is_empty() {
        round += 1;
        let ids: Vec<String> = members
            .iter()
            .map(|&m| graph.nodes[m].id.clone())
            .collect();
        CircleConverging {
            round,
            modules: &ids,
        }
        .log();

        let mut handles = Vec::with_capacity(members.len());
        for id in &ids {
            let task = Arc::clone(&task);
            let args = HookArgs::for_module(&context, id.clone());
            handles.push(tokio::spawn(async move {
                task.call("build-vendor-module", HookType::Parallel, args)
                    .await
                    .map(|_| ())
            }));
        }
        for handle in handles {
            match handle.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(PackError::internal(format!(
                        "circular group build panicked: {err}"
                    )));
                }
            }
        }

        let mut state = context.state.lock().await;
        let pkgs = context.pkgs()?;
        members = Vec::new();
        for &node in circle {
            let id = &graph.nodes[node].id;
            let bindings = current_bindings(&state, pkgs, id);
            if state.bindings_cur.get(id) != Some(&bindings) {
                state.bindings_cur.insert(id.clone(), bindings);
                members.push(node);
            }
        }
    }
    Ok(())
}

/// The bindings `id` currently has to provide: the already-recorded set plus
/// every binding any vendor module's imports take from it.
fn current_bindings(state: &BuildState, pkgs: &PkgGraph, id: &str) -> Vec<String> {
    let mut bindings: BTreeSet<String> = state
        .bindings_cur
        .get(id)
        .map(|b| b.iter().cloned().collect())
        .unwrap_or_default();
    for module in &state.cur.modules {
        if !pkgs.is_vendor_module(&module.id) {
            continue;
        }
        for import in &module.imports {
            if import.id == id {
                bindings.extend(import.bindings.iter().cloned());
            }
        }
    }
    bindings.into_iter().collect()
}

/// Carries the previous snapshot of an unchanged module into the current
/// manifest, re-resolving each import's module id against the current
/// package graph (a bundled transitive dependency may have moved).
fn carry_forward(state: &mut BuildState, pkgs: &PkgGraph, id: &str) -> Result<(), PackError> {
    let Some(previous) = state.pre.find(id) else {
        return Err(PackError::internal(format!(
            "unchanged module '{id}' has no previous snapshot"
        )));
    };
    let mut snapshot = previous.clone();
    let pkg = pkgs.pkg_by_module_name(id)?;
    for import in &mut snapshot.imports {
        let dep = pkgs.pkg_from_public_name(pkg, &import.name)?;
        import.id = pkgs.versioned_name(dep);
    }
    state.add_snapshot(snapshot);
    Ok(())
}

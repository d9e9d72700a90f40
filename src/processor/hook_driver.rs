// SPDX-License-Identifier: MIT

//! Named-hook registry with three call semantics and depth-first delegation
//! to child drivers.
//!
//! Each task owns one [`HookDriver`]. A driver declares the hook names it
//! understands; registering or calling a name the driver does not declare
//! falls through to its children in depth-first order, so a composed
//! pipeline exposes every hook of its parts through the root task.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::config::UserConfig;
use crate::context::BuildContext;
use crate::errors::PackError;
use crate::project::PkgGraph;

/// Boxed future returned by hook handlers and task actions.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Values a hook handler may hand back to its caller. Only `First` calls
/// consume them; `Sequential` and `Parallel` calls discard handler values.
#[derive(Debug, Clone)]
pub enum HookValue {
    Config(UserConfig),
    Project(PkgGraph),
}

pub type HookResult = Result<Option<HookValue>, PackError>;

/// A registered hook handler.
pub type HookFn = Arc<dyn Fn(HookArgs) -> BoxFuture<HookResult> + Send + Sync>;

/// Arguments passed to every hook invocation.
#[derive(Clone)]
pub struct HookArgs {
    /// Module name for per-module hooks, absent for pipeline-level hooks.
    pub module: Option<String>,
    pub context: Arc<BuildContext>,
}

impl HookArgs {
    pub fn bare(context: &Arc<BuildContext>) -> Self {
        HookArgs {
            module: None,
            context: Arc::clone(context),
        }
    }

    pub fn for_module(context: &Arc<BuildContext>, module: impl Into<String>) -> Self {
        HookArgs {
            module: Some(module.into()),
            context: Arc::clone(context),
        }
    }
}

/// Wraps an async closure into a [`HookFn`].
pub fn hook_fn<F, Fut>(f: F) -> HookFn
where
    F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookResult> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}

/// How a hook's handler list is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookType {
    /// Run handlers in registration order until one yields a value; later
    /// handlers are not invoked.
    First,
    /// Run handlers one after another, awaiting each before the next.
    Sequential,
    /// Spawn all handlers concurrently and wait for every one of them.
    Parallel,
}

pub struct HookDriver {
    label: String,
    declared: Vec<&'static str>,
    handlers: Mutex<HashMap<&'static str, Vec<HookFn>>>,
    children: Mutex<Vec<Arc<HookDriver>>>,
}

impl HookDriver {
    pub fn new(label: impl Into<String>, declared: &[&'static str]) -> Self {
        HookDriver {
            label: label.into(),
            declared: declared.to_vec(),
            handlers: Mutex::new(HashMap::new()),
            children: Mutex::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn add_child(&self, child: Arc<HookDriver>) {
        self.children.lock().unwrap().push(child);
    }

    fn declared_key(&self, name: &str) -> Option<&'static str> {
        self.declared.iter().copied().find(|d| *d == name)
    }

    /// Snapshot of the handler list for `name`, resolved depth-first.
    /// `None` means no driver in the subtree declares the hook.
    fn handlers_for(&self, name: &str) -> Option<Vec<HookFn>> {
        if let Some(key) = self.declared_key(name) {
            let map = self.handlers.lock().unwrap();
            return Some(map.get(key).cloned().unwrap_or_default());
        }
        let children = self.children.lock().unwrap().clone();
        children.iter().find_map(|child| child.handlers_for(name))
    }

    fn edit_handlers(&self, name: &str, edit: &mut dyn FnMut(&mut Vec<HookFn>)) -> bool {
        if let Some(key) = self.declared_key(name) {
            let mut map = self.handlers.lock().unwrap();
            edit(map.entry(key).or_default());
            return true;
        }
        let children = self.children.lock().unwrap().clone();
        children.iter().any(|child| child.edit_handlers(name, edit))
    }

    fn unknown_hook(&self, name: &str) -> PackError {
        PackError::IllegalHookInvocation {
            hook: name.to_string(),
            task: self.label.clone(),
        }
    }

    /// Appends a handler to the named hook.
    pub fn hook(&self, name: &str, handler: HookFn) -> Result<(), PackError> {
        if self.edit_handlers(name, &mut |fns| fns.push(handler.clone())) {
            Ok(())
        } else {
            Err(self.unknown_hook(name))
        }
    }

    /// Inserts a handler ahead of the existing handlers of the named hook.
    pub fn prepend(&self, name: &str, handler: HookFn) -> Result<(), PackError> {
        if self.edit_handlers(name, &mut |fns| fns.insert(0, handler.clone())) {
            Ok(())
        } else {
            Err(self.unknown_hook(name))
        }
    }

    /// Removes the most recently registered occurrence of `handler` from the
    /// named hook. Removing a handler that was never registered is a no-op.
    pub fn unhook(&self, name: &str, handler: &HookFn) -> Result<(), PackError> {
        if self.edit_handlers(name, &mut |fns| {
            if let Some(pos) = fns.iter().rposition(|f| Arc::ptr_eq(f, handler)) {
                fns.remove(pos);
            }
        }) {
            Ok(())
        } else {
            Err(self.unknown_hook(name))
        }
    }

    /// Invokes the named hook with the given call semantics.
    pub async fn call(
        &self,
        name: &str,
        hook_type: HookType,
        args: HookArgs,
    ) -> Result<Option<HookValue>, PackError> {
        let Some(fns) = self.handlers_for(name) else {
            return Err(self.unknown_hook(name));
        };
        tracing::trace!(hook = name, handlers = fns.len(), ?hook_type, "calling hook");
        match hook_type {
            HookType::First => {
                for f in &fns {
                    if let Some(value) = f(args.clone()).await? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
            HookType::Sequential => {
                for f in &fns {
                    f(args.clone()).await?;
                }
                Ok(None)
            }
            HookType::Parallel => {
                let handles: Vec<_> = fns
                    .iter()
                    .map(|f| tokio::spawn(f(args.clone())))
                    .collect();
                for handle in handles {
                    match handle.await {
                        Ok(result) => {
                            result?;
                        }
                        Err(err) => {
                            return Err(PackError::internal(format!(
                                "hook '{name}' handler panicked: {err}"
                            )));
                        }
                    }
                }
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for HookDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDriver")
            .field("label", &self.label)
            .field("declared", &self.declared)
            .field("children", &self.children.lock().unwrap().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context() -> Arc<BuildContext> {
        Arc::new(BuildContext::new())
    }

    fn counting(counter: Arc<AtomicUsize>) -> HookFn {
        hook_fn(move |_args| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        })
    }

    fn yielding_config() -> HookFn {
        hook_fn(|_args| async move { Ok(Some(HookValue::Config(UserConfig::default()))) })
    }

    #[tokio::test]
    async fn first_stops_at_the_first_value() {
        let driver = HookDriver::new("root", &["get-config"]);
        let after = Arc::new(AtomicUsize::new(0));
        driver.hook("get-config", yielding_config()).unwrap();
        driver.hook("get-config", counting(Arc::clone(&after))).unwrap();

        let value = driver
            .call("get-config", HookType::First, HookArgs::bare(&context()))
            .await
            .unwrap();
        assert!(matches!(value, Some(HookValue::Config(_))));
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sequential_runs_handlers_in_registration_order() {
        let driver = HookDriver::new("root", &["step"]);
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            driver
                .hook(
                    "step",
                    hook_fn(move |_args| {
                        let order = Arc::clone(&order);
                        async move {
                            order.lock().unwrap().push(tag);
                            Ok(None)
                        }
                    }),
                )
                .unwrap();
        }
        driver
            .call("step", HookType::Sequential, HookArgs::bare(&context()))
            .await
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn prepend_puts_a_handler_ahead_of_the_rest() {
        let driver = HookDriver::new("root", &["get-config"]);
        let late = Arc::new(AtomicUsize::new(0));
        driver.hook("get-config", counting(Arc::clone(&late))).unwrap();
        driver.prepend("get-config", yielding_config()).unwrap();

        let value = driver
            .call("get-config", HookType::First, HookArgs::bare(&context()))
            .await
            .unwrap();
        assert!(value.is_some());
        assert_eq!(late.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unhook_removes_the_last_occurrence() {
        let driver = HookDriver::new("root", &["step"]);
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = counting(Arc::clone(&counter));
        driver.hook("step", handler.clone()).unwrap();
        driver.hook("step", handler.clone()).unwrap();
        driver.unhook("step", &handler).unwrap();

        driver
            .call("step", HookType::Sequential, HookArgs::bare(&context()))
            .await
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_hook_names_are_rejected_at_registration_and_call() {
        let driver = HookDriver::new("root", &["step"]);
        let err = driver.hook("nope", yielding_config()).unwrap_err();
        assert_eq!(
            err,
            PackError::IllegalHookInvocation {
                hook: "nope".into(),
                task: "root".into(),
            }
        );
        let err = driver
            .call("nope", HookType::First, HookArgs::bare(&context()))
            .await
            .unwrap_err();
        assert!(matches!(err, PackError::IllegalHookInvocation { .. }));
    }

    #[tokio::test]
    async fn registration_and_calls_reach_nested_children_depth_first() {
        let root = Arc::new(HookDriver::new("root", &[]));
        let mid = Arc::new(HookDriver::new("mid", &[]));
        let leaf = Arc::new(HookDriver::new("leaf", &["deep"]));
        mid.add_child(Arc::clone(&leaf));
        root.add_child(Arc::clone(&mid));

        let counter = Arc::new(AtomicUsize::new(0));
        root.hook("deep", counting(Arc::clone(&counter))).unwrap();
        root.call("deep", HookType::Parallel, HookArgs::bare(&context()))
            .await
            .unwrap();
        // The handler landed on the leaf's own list.
        leaf.call("deep", HookType::Sequential, HookArgs::bare(&context()))
            .await
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn parallel_propagates_the_first_handler_error() {
        let driver = HookDriver::new("root", &["step"]);
        driver
            .hook(
                "step",
                hook_fn(|_args| async move {
                    Err(PackError::build_callback("m", "boom"))
                }),
            )
            .unwrap();
        driver.hook("step", yielding_config()).unwrap();

        let err = driver
            .call("step", HookType::Parallel, HookArgs::bare(&context()))
            .await
            .unwrap_err();
        assert_eq!(err, PackError::build_callback("m", "boom"));
    }
}

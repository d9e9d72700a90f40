// SPDX-License-Identifier: MIT

//! Bundler integration seam.
//!
//! Embedders implement [`ModuleBuilder`] and attach it to the pipeline's
//! `build-local-module` / `build-vendor-module` hooks with [`builder_hook`].
//! The builder is expected to record the resulting snapshot (imports,
//! exports) into the context's current manifest.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::BuildContext;
use crate::errors::PackError;
use crate::processor::{hook_fn, HookFn};

#[async_trait]
pub trait ModuleBuilder: Send + Sync {
    async fn build_module(&self, module: &str, context: &BuildContext) -> Result<(), PackError>;
}

/// Adapts a [`ModuleBuilder`] into a hook handler.
pub fn builder_hook(builder: Arc<dyn ModuleBuilder>) -> HookFn {
    hook_fn(move |args| {
        let builder = Arc::clone(&builder);
        async move {
            let Some(module) = args.module else {
                return Err(PackError::internal(
                    "a module build hook was invoked without a module name",
                ));
            };
            builder.build_module(&module, &args.context).await?;
            Ok(None)
        }
    })
}

// Copyright 2026 The Graft Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The Object Factory: the collaborator contract through which the injector
//! resolves setter dependencies.
//!
//! The factory is itself an extension point, materialised through its own
//! adaptive proxy. The runtime ships two implementations via internal
//! descriptor resources: the adaptive aggregator (the registered adaptive
//! class, which delegates to every ordinary factory in turn) and the SPI
//! factory, which supplies the collaborator contract's adaptive proxy.

use std::any::Any;
use std::sync::Once;

use crate::class::{ExtensionClass, FetchFn};
use crate::classpath::ClassPath;
use crate::error::Result;
use crate::point::{Extension, ExtensionPoint};
use crate::pool::ClassPool;

/// One dependency to resolve: the collaborator contract, the attribute the
/// value lands in, and a thunk producing the contract's adaptive proxy.
pub struct DependencyRequest {
    /// Fully-qualified point name of the collaborator contract.
    pub contract: &'static str,
    /// Attribute name derived from the setter.
    pub attribute: &'static str,
    /// Produce the collaborator's adaptive proxy, boxed as `Any`.
    pub fetch: FetchFn,
}

/// Resolves dependency requests during injection.
pub trait ObjectFactory: Extension {
    /// Produce a value for the request, or `None` when this factory has no
    /// answer for it.
    fn create(&self, request: &DependencyRequest) -> Result<Option<Box<dyn Any + Send + Sync>>>;
}

impl ExtensionPoint for dyn ObjectFactory {
    const POINT_NAME: &'static str = "graft.extension.ObjectFactory";

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }
}

/// Supplies extension-contract dependencies as their adaptive proxy.
pub struct SpiObjectFactory;

impl ObjectFactory for SpiObjectFactory {
    fn create(&self, request: &DependencyRequest) -> Result<Option<Box<dyn Any + Send + Sync>>> {
        (request.fetch)().map(Some)
    }
}

/// The registered adaptive class of the factory contract: asks every
/// ordinary factory in turn and returns the first value produced.
pub struct AdaptiveObjectFactory {
    factories: Vec<std::sync::Arc<dyn ObjectFactory>>,
}

impl AdaptiveObjectFactory {
    fn bootstrap() -> Result<Self> {
        let loader = crate::loader::loader_for::<dyn ObjectFactory>();
        let mut factories = Vec::new();
        for name in loader.supported_names()? {
            factories.push(loader.get(&name)?);
        }
        Ok(AdaptiveObjectFactory { factories })
    }
}

impl ObjectFactory for AdaptiveObjectFactory {
    fn create(&self, request: &DependencyRequest) -> Result<Option<Box<dyn Any + Send + Sync>>> {
        for factory in &self.factories {
            if let Some(value) = factory.create(request)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

static OBJECT_FACTORY_DESCRIPTORS: &[(&str, &str)] = &[(
    "META-INF/dubbo/internal/graft.extension.ObjectFactory",
    "adaptive=graft.extension.factory.AdaptiveObjectFactory\n\
     spi=graft.extension.factory.SpiObjectFactory\n",
)];

/// Register the runtime's own classes and internal descriptor resources.
/// Idempotent; driven by the first loader access in the process.
pub(crate) fn ensure_builtins() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        ClassPool::register(ExtensionClass::<dyn ObjectFactory>::adaptive::<AdaptiveObjectFactory>(
            "graft.extension.factory.AdaptiveObjectFactory",
            || Ok(Box::new(AdaptiveObjectFactory::bootstrap()?)),
        ));
        ClassPool::register(ExtensionClass::<dyn ObjectFactory>::ordinary::<SpiObjectFactory>(
            "graft.extension.factory.SpiObjectFactory",
            || Ok(Box::new(SpiObjectFactory)),
        ));
        ClassPath::global().add_static(OBJECT_FACTORY_DESCRIPTORS);
    });
}

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

//! The loader façade.
//!
//! One [`ExtensionLoader`] exists per capability contract, obtained through
//! [`loader_for`]. The loader owns the contract's registry and drives
//! discovery, classification, construction, injection and wrapping on
//! demand. A process-wide index memoises loaders; a loser of the creation
//! race discards its loader and adopts the winner's.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock, RwLock};

use crate::class::{ClassKind, ExtensionClass};
use crate::error::{ExtensionError, Result};
use crate::factory::ObjectFactory;
use crate::inject::inject_setters;
use crate::point::ExtensionPoint;
use crate::registry::ExtensionRegistry;

/// The sentinel name that asks for the contract's default extension.
pub const TRUE_SENTINEL: &str = "true";

static LOADERS: OnceLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> = OnceLock::new();

fn loaders() -> &'static RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>> {
    LOADERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The loader for the contract `T`, created on first access.
pub fn loader_for<T: ExtensionPoint + ?Sized>() -> Arc<ExtensionLoader<T>> {
    crate::factory::ensure_builtins();
    let key = TypeId::of::<T>();
    if let Some(existing) = loaders().read().expect("loader index poisoned").get(&key) {
        return existing
            .clone()
            .downcast::<ExtensionLoader<T>>()
            .expect("loader index holds a loader of the wrong type");
    }

    // Construct outside the lock; on a race the loser's loader is dropped.
    let fresh: Arc<ExtensionLoader<T>> = Arc::new(ExtensionLoader::new());
    let mut map = loaders().write().expect("loader index poisoned");
    map.entry(key)
        .or_insert_with(|| {
            let erased: Arc<dyn Any + Send + Sync> = fresh;
            erased
        })
        .clone()
        .downcast::<ExtensionLoader<T>>()
        .expect("loader index holds a loader of the wrong type")
}

/// Drop the loader (and every instance it cached) for the contract `T`.
///
/// Test support only: production code never unloads a contract.
pub fn reset_loader_for<T: ExtensionPoint + ?Sized>() {
    loaders()
        .write()
        .expect("loader index poisoned")
        .remove(&TypeId::of::<T>());
}

/// Per-contract façade over discovery, construction and caching.
pub struct ExtensionLoader<T: ExtensionPoint + ?Sized> {
    registry: ExtensionRegistry<T>,
    object_factory: Option<Arc<dyn ObjectFactory>>,
}

impl<T: ExtensionPoint + ?Sized> ExtensionLoader<T> {
    fn new() -> Self {
        // The factory contract's own loader runs without a factory so its
        // bootstrap cannot recurse into itself.
        let object_factory = if TypeId::of::<T>() == TypeId::of::<dyn ObjectFactory>() {
            None
        } else {
            match loader_for::<dyn ObjectFactory>().get_adaptive() {
                Ok(factory) => Some(factory),
                Err(e) => {
                    log::error!(
                        "Failed to initialise the object factory for extension point '{}': {}",
                        T::POINT_NAME,
                        e
                    );
                    None
                }
            }
        };
        ExtensionLoader {
            registry: ExtensionRegistry::new(),
            object_factory,
        }
    }

    /// The constructed, injected, wrapped instance registered under `name`.
    ///
    /// The sentinel `"true"` asks for the default extension. The first
    /// success per name is cached; every later call returns the identical
    /// instance.
    pub fn get(&self, name: &str) -> Result<Arc<T>> {
        if name.is_empty() {
            return Err(ExtensionError::usage("Extension name is empty"));
        }
        if name == TRUE_SENTINEL {
            return match self.get_default()? {
                Some(instance) => Ok(instance),
                None => Err(ExtensionError::NoSuchExtension {
                    point: T::POINT_NAME.to_string(),
                    name: name.to_string(),
                    causes: ", cause: no default extension name is declared".to_string(),
                }),
            };
        }
        let holder = self.registry.instance_holder(name);
        holder
            .get_or_try_init(|| self.create_extension(name))
            .cloned()
    }

    /// The instance for the contract's default name, or `None` when the
    /// contract declares no usable default.
    pub fn get_default(&self) -> Result<Option<Arc<T>>> {
        match self.default_name()? {
            Some(name) => Ok(Some(self.get(&name)?)),
            None => Ok(None),
        }
    }

    /// The declared default name, with the `"true"` placeholder treated as
    /// no default.
    pub fn default_name(&self) -> Result<Option<String>> {
        let table = self.registry.classes()?;
        let name = table
            .read()
            .expect("class table poisoned")
            .default_name()
            .filter(|n| *n != TRUE_SENTINEL)
            .map(str::to_string);
        Ok(name)
    }

    /// Sorted set of every known extension name. Triggers class loading.
    pub fn supported_names(&self) -> Result<BTreeSet<String>> {
        let table = self.registry.classes()?;
        let names = table.read().expect("class table poisoned").names();
        Ok(names)
    }

    /// Whether a name is known. Triggers class loading only, never
    /// construction.
    pub fn has(&self, name: &str) -> Result<bool> {
        if name.is_empty() {
            return Err(ExtensionError::usage("Extension name is empty"));
        }
        let table = self.registry.classes()?;
        let present = table.read().expect("class table poisoned").contains(name);
        Ok(present)
    }

    /// Whether an instance has already been constructed for `name`.
    pub fn loaded(&self, name: &str) -> bool {
        self.registry.loaded_instance(name).is_some()
    }

    /// The instance already constructed for `name`, without triggering
    /// construction.
    pub fn loaded_extension(&self, name: &str) -> Option<Arc<T>> {
        self.registry.loaded_instance(name)
    }

    /// Sorted names of every extension already constructed.
    pub fn loaded_names(&self) -> BTreeSet<String> {
        self.registry.loaded_names()
    }

    /// The cached adaptive instance, if one was built.
    pub fn loaded_adaptive(&self) -> Option<Arc<T>> {
        self.registry.loaded_adaptive()
    }

    /// The primary extension name of an instance's concrete class, or `None`
    /// for unregistered classes (wrappers included).
    pub fn extension_name_of(&self, instance: &T) -> Result<Option<String>> {
        let table = self.registry.classes()?;
        let type_id = T::as_any(instance).type_id();
        let name = table
            .read()
            .expect("class table poisoned")
            .primary_name_of(type_id)
            .map(str::to_string);
        Ok(name)
    }

    /// Register a new extension class under a name absent so far.
    pub fn add(&self, name: &str, class: ExtensionClass<T>) -> Result<()> {
        let table = self.registry.classes()?;
        table
            .write()
            .expect("class table poisoned")
            .admin_add(name, Arc::new(class))
    }

    /// Replace the class registered under an existing name and invalidate
    /// the cached instance. Replacing the adaptive class also invalidates
    /// the cached adaptive instance.
    pub fn replace(&self, name: &str, class: ExtensionClass<T>) -> Result<()> {
        let adaptive = matches!(class.kind(), ClassKind::Adaptive(_));
        let table = self.registry.classes()?;
        table
            .write()
            .expect("class table poisoned")
            .admin_replace(name, Arc::new(class))?;
        if adaptive {
            self.registry.invalidate_adaptive();
        } else {
            self.registry.invalidate_instance(name);
        }
        Ok(())
    }

    pub(crate) fn registry(&self) -> &ExtensionRegistry<T> {
        &self.registry
    }

    pub(crate) fn object_factory(&self) -> Option<&Arc<dyn ObjectFactory>> {
        self.object_factory.as_ref()
    }

    fn create_extension(&self, name: &str) -> Result<Arc<T>> {
        let table = self.registry.classes()?;
        let (class, wrappers) = {
            let table = table.read().expect("class table poisoned");
            match table.get(name) {
                Some(class) => (class, table.wrappers()),
                None => return Err(table.no_such_extension(name)),
            }
        };

        let raw_holder = self.registry.raw_instance_holder(class.instance_type());
        let mut instance = raw_holder
            .get_or_try_init(|| self.instantiate(&class, name))
            .cloned()?;

        for wrapper in wrappers {
            instance = self.apply_wrapper(&wrapper, instance, name)?;
        }
        Ok(instance)
    }

    fn instantiate(&self, class: &ExtensionClass<T>, name: &str) -> Result<Arc<T>> {
        let ClassKind::Ordinary(construct) = class.kind() else {
            return Err(ExtensionError::construction(
                T::POINT_NAME,
                name,
                format!("class {} is not an ordinary extension", class.id()),
            ));
        };
        let mut boxed = construct().map_err(|e| {
            ExtensionError::construction(
                T::POINT_NAME,
                name,
                format!("{} ({})", e, class.instance_type_name()),
            )
        })?;
        inject_setters(
            &mut *boxed,
            class.id(),
            class.setters(),
            self.object_factory.as_ref(),
        );
        Ok(Arc::from(boxed))
    }

    fn apply_wrapper(
        &self,
        wrapper: &ExtensionClass<T>,
        inner: Arc<T>,
        name: &str,
    ) -> Result<Arc<T>> {
        let ClassKind::Wrapper(wrap) = wrapper.kind() else {
            return Err(ExtensionError::construction(
                T::POINT_NAME,
                name,
                format!("class {} is not a wrapper", wrapper.id()),
            ));
        };
        let mut boxed = wrap(inner).map_err(|e| {
            ExtensionError::construction(
                T::POINT_NAME,
                name,
                format!("wrapper {} failed: {}", wrapper.id(), e),
            )
        })?;
        inject_setters(
            &mut *boxed,
            wrapper.id(),
            wrapper.setters(),
            self.object_factory.as_ref(),
        );
        Ok(Arc::from(boxed))
    }
}

impl<T: ExtensionPoint + ?Sized> std::fmt::Debug for ExtensionLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionLoader")
            .field("point", &T::POINT_NAME)
            .finish()
    }
}

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

//! Process-wide pool of registered implementation classes.
//!
//! The pool is the runtime's classpath: hosts and plugins register every
//! implementation class they ship, keyed by fully-qualified id, and
//! descriptor lines resolve against it. Registration is programmatic, the
//! way statically-linked plugins register their descriptors with a host
//! server.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::class::ExtensionClass;
use crate::error::{ExtensionError, Result};
use crate::point::ExtensionPoint;

struct PoolEntry {
    point: &'static str,
    class: Arc<dyn Any + Send + Sync>,
}

static POOL: OnceLock<RwLock<HashMap<String, PoolEntry>>> = OnceLock::new();

fn pool() -> &'static RwLock<HashMap<String, PoolEntry>> {
    POOL.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The global implementation-class pool.
pub struct ClassPool;

impl ClassPool {
    /// Register one implementation class under its fully-qualified id.
    ///
    /// The earliest registration of an id wins, like the first classpath
    /// entry shadowing later ones; a conflicting re-registration is logged
    /// and ignored.
    pub fn register<T: ExtensionPoint + ?Sized>(class: ExtensionClass<T>) {
        let id = class.id().to_string();
        let entry = PoolEntry {
            point: T::POINT_NAME,
            class: Arc::new(class),
        };
        let mut map = pool().write().expect("class pool poisoned");
        if map.contains_key(&id) {
            log::warn!("Implementation class {} already registered, keeping the first", id);
            return;
        }
        map.insert(id, entry);
    }

    /// Whether an implementation id is registered, for any contract.
    pub fn contains(id: &str) -> bool {
        pool().read().expect("class pool poisoned").contains_key(id)
    }

    /// Resolve an implementation id into a class for the contract `T`.
    ///
    /// Fails fast with a recorded diagnostic when the id is unknown or the
    /// class belongs to a different contract.
    pub(crate) fn resolve<T: ExtensionPoint + ?Sized>(id: &str) -> Result<Arc<ExtensionClass<T>>> {
        let map = pool().read().expect("class pool poisoned");
        let entry = map.get(id).ok_or_else(|| ExtensionError::ClassNotFound {
            id: id.to_string(),
        })?;
        entry
            .class
            .clone()
            .downcast::<ExtensionClass<T>>()
            .map_err(|_| ExtensionError::NotAssignable {
                point: T::POINT_NAME.to_string(),
                id: id.to_string(),
                actual: entry.point.to_string(),
            })
    }
}

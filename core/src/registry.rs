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

//! Per-contract registry: descriptor scanning, classification, and caches.
//!
//! The class table is populated once, lazily, by scanning the six descriptor
//! resource paths for the contract and classifying every resolved class as
//! adaptive, wrapper, or ordinary. Per-line failures are captured in the
//! table's diagnostics and never abort the scan; they resurface later when a
//! caller asks for a name that one of the failed lines could have provided.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::class::{ClassKind, ExtensionClass};
use crate::classpath::ClassPath;
use crate::descriptor::{parse_resource, DescriptorLine};
use crate::error::{ExtensionError, Result};
use crate::holder::Holder;
use crate::point::{simple_name, Activate, ExtensionPoint};

const INTERNAL_DIRECTORY: &str = "META-INF/dubbo/internal/";
const DUBBO_DIRECTORY: &str = "META-INF/dubbo/";
const SERVICES_DIRECTORY: &str = "META-INF/services/";

/// The vendor prefix remap applied to produce the fallback resource name,
/// preserving descriptors written under the older vendor.
fn vendor_alias(point_name: &str) -> String {
    point_name.replace("org.apache", "com.alibaba")
}

/// Classification result for one contract: every map the loader reads.
pub(crate) struct ClassTable<T: ExtensionPoint + ?Sized> {
    /// name -> class, in discovery order.
    by_name: Vec<(String, Arc<ExtensionClass<T>>)>,
    /// concrete instance type -> primary name.
    primary_names: HashMap<TypeId, String>,
    /// primary name -> activation metadata, in discovery order.
    activates: Vec<(String, Activate)>,
    /// wrapper classes, de-duplicated, in discovery order.
    wrappers: Vec<Arc<ExtensionClass<T>>>,
    /// the at-most-one adaptive class.
    adaptive: Option<Arc<ExtensionClass<T>>>,
    /// default extension name from the contract declaration.
    default_name: Option<String>,
    /// raw descriptor line -> captured error, in discovery order.
    diagnostics: Vec<(String, ExtensionError)>,
}

impl<T: ExtensionPoint + ?Sized> ClassTable<T> {
    /// Scan the classpath and classify every descriptor entry for `T`.
    fn load() -> Result<Self> {
        let mut table = ClassTable {
            by_name: Vec::new(),
            primary_names: HashMap::new(),
            activates: Vec::new(),
            wrappers: Vec::new(),
            adaptive: None,
            default_name: default_extension_name::<T>()?,
            diagnostics: Vec::new(),
        };

        let point = T::POINT_NAME;
        let alias = vendor_alias(point);
        for dir in [INTERNAL_DIRECTORY, DUBBO_DIRECTORY, SERVICES_DIRECTORY] {
            for name in [point, alias.as_str()] {
                let path = format!("{}{}", dir, name);
                for (origin, contents) in ClassPath::global().read_all(&path) {
                    for entry in parse_resource(&contents) {
                        if let Err(e) = table.classify(&entry) {
                            log::warn!(
                                "Failed to load extension class (extension point: {}, line: {}) in {}: {}",
                                point,
                                entry.raw,
                                origin,
                                e
                            );
                            table.record_diagnostic(&entry.raw, e);
                        }
                    }
                }
            }
        }
        Ok(table)
    }

    fn classify(&mut self, entry: &DescriptorLine) -> Result<()> {
        let class = crate::pool::ClassPool::resolve::<T>(&entry.id)?;
        if matches!(class.kind(), ClassKind::Adaptive(_)) {
            self.classify_adaptive(class)
        } else if matches!(class.kind(), ClassKind::Wrapper(_)) {
            self.classify_wrapper(class);
            Ok(())
        } else {
            self.classify_ordinary(class, &entry.names)
        }
    }

    fn classify_adaptive(&mut self, class: Arc<ExtensionClass<T>>) -> Result<()> {
        match &self.adaptive {
            None => {
                self.adaptive = Some(class);
                Ok(())
            }
            Some(existing) if existing.id() == class.id() => Ok(()),
            Some(existing) => Err(ExtensionError::DuplicateAdaptive {
                point: T::POINT_NAME.to_string(),
                existing: existing.id().to_string(),
                incoming: class.id().to_string(),
            }),
        }
    }

    fn classify_wrapper(&mut self, class: Arc<ExtensionClass<T>>) {
        if !self.wrappers.iter().any(|w| w.id() == class.id()) {
            self.wrappers.push(class);
        }
    }

    fn classify_ordinary(
        &mut self,
        class: Arc<ExtensionClass<T>>,
        explicit_names: &[String],
    ) -> Result<()> {
        let names: Vec<String> = if explicit_names.is_empty() {
            let derived = class.derived_name(simple_name(T::POINT_NAME));
            if derived.is_empty() {
                return Err(ExtensionError::MissingName {
                    point: T::POINT_NAME.to_string(),
                    id: class.id().to_string(),
                });
            }
            vec![derived]
        } else {
            explicit_names.to_vec()
        };

        if let Some(activate) = class.activate() {
            let primary = &names[0];
            if !self.activates.iter().any(|(n, _)| n == primary) {
                self.activates.push((primary.clone(), activate.clone()));
            }
        }
        for name in &names {
            self.insert_name(name, class.clone())?;
        }
        Ok(())
    }

    /// The `by_name` conflict rule: same class is a no-op, a different class
    /// under an existing name is a hard error.
    fn insert_name(&mut self, name: &str, class: Arc<ExtensionClass<T>>) -> Result<()> {
        if let Some((_, existing)) = self.by_name.iter().find(|(n, _)| n == name) {
            if existing.id() == class.id() {
                return Ok(());
            }
            return Err(ExtensionError::DuplicateName {
                point: T::POINT_NAME.to_string(),
                name: name.to_string(),
                existing: existing.id().to_string(),
                incoming: class.id().to_string(),
            });
        }
        self.primary_names
            .entry(class.instance_type())
            .or_insert_with(|| name.to_string());
        self.by_name.push((name.to_string(), class));
        Ok(())
    }

    fn record_diagnostic(&mut self, raw_line: &str, error: ExtensionError) {
        if !self.diagnostics.iter().any(|(line, _)| line == raw_line) {
            let captured = ExtensionError::Descriptor {
                point: T::POINT_NAME.to_string(),
                line: raw_line.to_string(),
                cause: error.to_string(),
            };
            self.diagnostics.push((raw_line.to_string(), captured));
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<ExtensionClass<T>>> {
        self.by_name
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, class)| class.clone())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.by_name.iter().any(|(n, _)| n == name)
    }

    pub(crate) fn names(&self) -> BTreeSet<String> {
        self.by_name.iter().map(|(n, _)| n.clone()).collect()
    }

    pub(crate) fn primary_name_of(&self, instance_type: TypeId) -> Option<&str> {
        self.primary_names.get(&instance_type).map(|n| n.as_str())
    }

    pub(crate) fn activates(&self) -> &[(String, Activate)] {
        &self.activates
    }

    pub(crate) fn wrappers(&self) -> Vec<Arc<ExtensionClass<T>>> {
        self.wrappers.clone()
    }

    pub(crate) fn adaptive_class(&self) -> Option<Arc<ExtensionClass<T>>> {
        self.adaptive.clone()
    }

    pub(crate) fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Build the no-such-extension error for a name, folding in captured
    /// diagnostics. A diagnostic whose raw line mentions the name (case
    /// insensitive) is surfaced alone; otherwise every capture is listed.
    pub(crate) fn no_such_extension(&self, name: &str) -> ExtensionError {
        let lower = name.to_lowercase();
        if let Some((_, error)) = self
            .diagnostics
            .iter()
            .find(|(line, _)| line.to_lowercase().contains(&lower))
        {
            return ExtensionError::NoSuchExtension {
                point: T::POINT_NAME.to_string(),
                name: name.to_string(),
                causes: format!(", cause: {}", error),
            };
        }

        let mut causes = String::new();
        for (i, (line, error)) in self.diagnostics.iter().enumerate() {
            if i == 0 {
                causes.push_str(", possible causes: ");
            }
            causes.push_str(&format!("({}) {}: {} ", i + 1, line, error));
        }
        ExtensionError::NoSuchExtension {
            point: T::POINT_NAME.to_string(),
            name: name.to_string(),
            causes,
        }
    }

    // Administrative mutation, used by the loader's add/replace API.

    pub(crate) fn admin_add(&mut self, name: &str, class: Arc<ExtensionClass<T>>) -> Result<()> {
        if matches!(class.kind(), ClassKind::Adaptive(_)) {
            return match &self.adaptive {
                Some(existing) => Err(ExtensionError::DuplicateAdaptive {
                    point: T::POINT_NAME.to_string(),
                    existing: existing.id().to_string(),
                    incoming: class.id().to_string(),
                }),
                None => {
                    self.adaptive = Some(class);
                    Ok(())
                }
            };
        }
        if matches!(class.kind(), ClassKind::Wrapper(_)) {
            self.classify_wrapper(class);
            return Ok(());
        }

        if name.is_empty() {
            return Err(ExtensionError::usage("Extension name is empty"));
        }
        if self.contains(name) {
            return Err(ExtensionError::AlreadyExists {
                point: T::POINT_NAME.to_string(),
                name: name.to_string(),
            });
        }
        if let Some(activate) = class.activate() {
            self.activates.push((name.to_string(), activate.clone()));
        }
        self.insert_name(name, class)
    }

    pub(crate) fn admin_replace(&mut self, name: &str, class: Arc<ExtensionClass<T>>) -> Result<()> {
        if matches!(class.kind(), ClassKind::Adaptive(_)) {
            if self.adaptive.is_none() {
                return Err(ExtensionError::NotRegistered {
                    point: T::POINT_NAME.to_string(),
                    name: name.to_string(),
                });
            }
            self.adaptive = Some(class);
            return Ok(());
        }
        if matches!(class.kind(), ClassKind::Wrapper(_)) {
            return Err(ExtensionError::usage(
                "replace is not defined for wrapper classes",
            ));
        }

        if name.is_empty() {
            return Err(ExtensionError::usage("Extension name is empty"));
        }
        let class_type = class.instance_type();
        let slot = self
            .by_name
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| ExtensionError::NotRegistered {
                point: T::POINT_NAME.to_string(),
                name: name.to_string(),
            })?;
        slot.1 = class;
        self.primary_names
            .entry(class_type)
            .or_insert_with(|| name.to_string());
        Ok(())
    }
}

/// Validate and extract the contract's declared default name. More than one
/// comma-separated name is a hard error.
fn default_extension_name<T: ExtensionPoint + ?Sized>() -> Result<Option<String>> {
    let Some(declared) = T::DEFAULT_NAME else {
        return Ok(None);
    };
    let names: Vec<&str> = declared
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if names.len() > 1 {
        return Err(ExtensionError::DefaultNameConflict {
            point: T::POINT_NAME.to_string(),
            names: names.join(", "),
        });
    }
    Ok(names.first().map(|n| n.to_string()))
}

/// Per-contract store: the lazily built class table plus every instance
/// cache. Owned by exactly one loader.
pub(crate) struct ExtensionRegistry<T: ExtensionPoint + ?Sized> {
    classes: Holder<RwLock<ClassTable<T>>>,
    instances: Mutex<HashMap<String, Arc<Holder<Arc<T>>>>>,
    raw_instances: Mutex<HashMap<TypeId, Arc<Holder<Arc<T>>>>>,
    adaptive_instance: RwLock<Option<Arc<T>>>,
    adaptive_error: Mutex<Option<ExtensionError>>,
    adaptive_build: Mutex<()>,
}

impl<T: ExtensionPoint + ?Sized> ExtensionRegistry<T> {
    pub(crate) fn new() -> Self {
        ExtensionRegistry {
            classes: Holder::new(),
            instances: Mutex::new(HashMap::new()),
            raw_instances: Mutex::new(HashMap::new()),
            adaptive_instance: RwLock::new(None),
            adaptive_error: Mutex::new(None),
            adaptive_build: Mutex::new(()),
        }
    }

    /// The class table, scanned and classified on first access.
    pub(crate) fn classes(&self) -> Result<&RwLock<ClassTable<T>>> {
        self.classes
            .get_or_try_init(|| ClassTable::load().map(RwLock::new))
    }

    /// The per-name instance slot, created on demand.
    pub(crate) fn instance_holder(&self, name: &str) -> Arc<Holder<Arc<T>>> {
        let mut map = self.instances.lock().expect("instance map poisoned");
        map.entry(name.to_string())
            .or_insert_with(|| Arc::new(Holder::new()))
            .clone()
    }

    /// The shared raw-instance slot for one implementation class. Names
    /// aliasing the same class share the underlying instance; wrapper chains
    /// are still built per name.
    pub(crate) fn raw_instance_holder(&self, instance_type: TypeId) -> Arc<Holder<Arc<T>>> {
        let mut map = self.raw_instances.lock().expect("raw instance map poisoned");
        map.entry(instance_type)
            .or_insert_with(|| Arc::new(Holder::new()))
            .clone()
    }

    /// The instance already published for a name, without construction.
    pub(crate) fn loaded_instance(&self, name: &str) -> Option<Arc<T>> {
        let map = self.instances.lock().expect("instance map poisoned");
        map.get(name).and_then(|holder| holder.get().cloned())
    }

    /// Names whose instance slot is filled, sorted.
    pub(crate) fn loaded_names(&self) -> BTreeSet<String> {
        let map = self.instances.lock().expect("instance map poisoned");
        map.iter()
            .filter(|(_, holder)| holder.get().is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Drop the cached instance for a name, after an administrative replace.
    pub(crate) fn invalidate_instance(&self, name: &str) {
        let mut map = self.instances.lock().expect("instance map poisoned");
        map.remove(name);
    }

    pub(crate) fn loaded_adaptive(&self) -> Option<Arc<T>> {
        self.adaptive_instance
            .read()
            .expect("adaptive slot poisoned")
            .clone()
    }

    pub(crate) fn adaptive_error(&self) -> Option<ExtensionError> {
        self.adaptive_error
            .lock()
            .expect("adaptive error slot poisoned")
            .clone()
    }

    pub(crate) fn set_adaptive_error(&self, error: ExtensionError) {
        *self.adaptive_error.lock().expect("adaptive error slot poisoned") = Some(error);
    }

    pub(crate) fn publish_adaptive(&self, instance: Arc<T>) {
        *self.adaptive_instance.write().expect("adaptive slot poisoned") = Some(instance);
    }

    /// Drop the cached adaptive instance and its sticky error, after an
    /// administrative replace of the adaptive class.
    pub(crate) fn invalidate_adaptive(&self) {
        *self.adaptive_instance.write().expect("adaptive slot poisoned") = None;
        *self.adaptive_error.lock().expect("adaptive error slot poisoned") = None;
    }

    /// Serialises adaptive builds; the double-checked locking guard.
    pub(crate) fn adaptive_build_guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.adaptive_build.lock().expect("adaptive build lock poisoned")
    }
}

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

//! Implementation class descriptors.
//!
//! An [`ExtensionClass`] is the runtime's stand-in for a loadable class: a
//! fully-qualified implementation id, a constructor of one of three kinds,
//! and the metadata the source ecosystem would read off the class through
//! reflection — activation attributes and setter-style injection
//! requirements. Implementations register these in the [`crate::pool`] so
//! descriptor lines can resolve them by id.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::point::{simple_name, Activate};

/// Nullary constructor of an ordinary or adaptive implementation.
pub type ConstructFn<T> = fn() -> Result<Box<T>>;

/// Constructor of a wrapper implementation, taking the wrapped stage.
pub type WrapFn<T> = fn(Arc<T>) -> Result<Box<T>>;

/// Produces the dependency value for one setter, typically the adaptive
/// proxy of the collaborator contract boxed as `Any`.
pub type FetchFn = fn() -> Result<Box<dyn Any + Send + Sync>>;

/// Applies a fetched dependency value to the target instance.
pub type ApplyFn = fn(&mut dyn Any, Box<dyn Any + Send + Sync>) -> Result<()>;

/// One setter-style injection requirement published by an implementation.
///
/// The abstract restatement of setter scanning: the implementation names the
/// attribute and the collaborator contract, supplies a fetch thunk the object
/// factory may invoke, and an apply thunk that downcasts and stores the value.
pub struct SetterDef {
    /// Attribute name, e.g. `"counter"` for a `set_counter` setter.
    pub attribute: &'static str,
    /// Fully-qualified point name of the collaborator contract.
    pub contract: &'static str,
    /// Produce the collaborator value (usually its adaptive proxy).
    pub fetch: FetchFn,
    /// Store the value on the target instance.
    pub apply: ApplyFn,
    /// Injection-disabled marker: the injector skips this entry.
    pub disabled: bool,
}

impl SetterDef {
    /// Create an enabled setter requirement.
    pub fn new(attribute: &'static str, contract: &'static str, fetch: FetchFn, apply: ApplyFn) -> Self {
        SetterDef {
            attribute,
            contract,
            fetch,
            apply,
            disabled: false,
        }
    }

    /// Mark this setter as injection-disabled, builder style.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl fmt::Debug for SetterDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetterDef")
            .field("attribute", &self.attribute)
            .field("contract", &self.contract)
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// How an implementation class is constructed, which decides its
/// classification.
pub enum ClassKind<T: ?Sized> {
    /// Nullary constructor; registered under one or more names.
    Ordinary(ConstructFn<T>),
    /// Constructor taking the contract itself; joins the wrapper chain.
    Wrapper(WrapFn<T>),
    /// Marked adaptive at type level; used as-is for the adaptive proxy.
    Adaptive(ConstructFn<T>),
}

impl<T: ?Sized> fmt::Debug for ClassKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Ordinary(_) => write!(f, "Ordinary"),
            ClassKind::Wrapper(_) => write!(f, "Wrapper"),
            ClassKind::Adaptive(_) => write!(f, "Adaptive"),
        }
    }
}

/// A registered implementation class for the contract `T`.
pub struct ExtensionClass<T: ?Sized> {
    id: String,
    kind: ClassKind<T>,
    activate: Option<Activate>,
    setters: Vec<SetterDef>,
    instance_type: TypeId,
    instance_type_name: &'static str,
}

impl<T: ?Sized> ExtensionClass<T> {
    /// Register an ordinary implementation of concrete type `C`.
    pub fn ordinary<C: Any>(id: impl Into<String>, construct: ConstructFn<T>) -> Self {
        Self::with_kind::<C>(id, ClassKind::Ordinary(construct))
    }

    /// Register a wrapper implementation of concrete type `C`.
    pub fn wrapper<C: Any>(id: impl Into<String>, wrap: WrapFn<T>) -> Self {
        Self::with_kind::<C>(id, ClassKind::Wrapper(wrap))
    }

    /// Register an adaptive implementation of concrete type `C`.
    pub fn adaptive<C: Any>(id: impl Into<String>, construct: ConstructFn<T>) -> Self {
        Self::with_kind::<C>(id, ClassKind::Adaptive(construct))
    }

    fn with_kind<C: Any>(id: impl Into<String>, kind: ClassKind<T>) -> Self {
        ExtensionClass {
            id: id.into(),
            kind,
            activate: None,
            setters: Vec::new(),
            instance_type: TypeId::of::<C>(),
            instance_type_name: std::any::type_name::<C>(),
        }
    }

    /// Attach activation metadata, builder style.
    pub fn with_activate(mut self, activate: Activate) -> Self {
        self.activate = Some(activate);
        self
    }

    /// Declare one setter-style injection requirement, builder style.
    pub fn with_setter(mut self, setter: SetterDef) -> Self {
        self.setters.push(setter);
        self
    }

    /// Fully-qualified implementation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Simple class name, the last segment of the id.
    pub fn class_simple_name(&self) -> &str {
        simple_name(&self.id)
    }

    /// Derive the extension name from the simple class name: strip the
    /// contract's simple name as a suffix and lowercase the rest.
    pub(crate) fn derived_name(&self, point_simple_name: &str) -> String {
        let simple = self.class_simple_name();
        let stem = simple.strip_suffix(point_simple_name).unwrap_or(simple);
        stem.to_lowercase()
    }

    pub(crate) fn kind(&self) -> &ClassKind<T> {
        &self.kind
    }

    /// Activation metadata, if the class carries the activate marker.
    pub fn activate(&self) -> Option<&Activate> {
        self.activate.as_ref()
    }

    pub(crate) fn setters(&self) -> &[SetterDef] {
        &self.setters
    }

    /// `TypeId` of the concrete instance type.
    pub fn instance_type(&self) -> TypeId {
        self.instance_type
    }

    pub(crate) fn instance_type_name(&self) -> &'static str {
        self.instance_type_name
    }
}

impl<T: ?Sized> fmt::Debug for ExtensionClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionClass")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("activate", &self.activate)
            .field("setters", &self.setters)
            .finish()
    }
}

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

//! Contract-side declarations.
//!
//! A capability contract is an object-safe trait whose trait object type
//! implements [`ExtensionPoint`]. The impl block is the Rust rendering of an
//! extension-point annotation: it carries the fully-qualified point name used
//! to locate descriptor resources, the optional default extension name, and
//! the build-time synthesised adaptive proxy for the contract.
//!
//! ```ignore
//! pub trait Greeter: Extension {
//!     fn greet(&self, url: &Url, who: &str) -> Result<String>;
//! }
//!
//! impl ExtensionPoint for dyn Greeter {
//!     const POINT_NAME: &'static str = "org.apache.demo.Greeter";
//!     const DEFAULT_NAME: Option<&'static str> = Some("en");
//!
//!     fn as_any(instance: &Self) -> &dyn Any {
//!         instance
//!     }
//!     fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
//!         instance
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::{ExtensionError, Result};
use crate::loader::ExtensionLoader;

/// Base trait every extension instance satisfies.
///
/// The blanket impl makes every `Send + Sync + 'static` type an extension;
/// contracts list it as a supertrait so instances can be downcast during
/// injection and identity checks.
pub trait Extension: Any + Send + Sync {}

impl<T: Any + Send + Sync> Extension for T {}

/// Declares a trait-object type as an extension point.
///
/// Implemented for the `dyn Trait` type of a contract, never for concrete
/// implementations. The interface-like and annotated-as-extension-point
/// preconditions of the loader API are discharged by this bound at compile
/// time.
pub trait ExtensionPoint: Send + Sync + 'static {
    /// Fully-qualified extension point name. Descriptor resources for the
    /// contract are looked up under this name (and its vendor alias).
    const POINT_NAME: &'static str;

    /// Default extension name declared by the contract, if any. A
    /// comma-separated list here is rejected at classification time.
    const DEFAULT_NAME: Option<&'static str> = None;

    /// Upcast an instance for downcasting to its concrete type.
    fn as_any(instance: &Self) -> &dyn Any;

    /// Mutable variant of [`ExtensionPoint::as_any`].
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any;

    /// Build the synthesised adaptive proxy for this contract.
    ///
    /// Called by the loader only when no registered implementation class is
    /// marked adaptive. Contracts with adaptive operations generate a proxy
    /// here (dispatching through
    /// [`ExtensionLoader::adaptive_target`]); the default
    /// declares that the contract has none, which the loader caches as the
    /// sticky adaptive build failure.
    fn synthesize(loader: Arc<ExtensionLoader<Self>>) -> Result<Box<Self>> {
        let _ = loader;
        Err(ExtensionError::adaptive_build(
            Self::POINT_NAME,
            "contract declares no adaptive operations and no adaptive class is registered",
        ))
    }
}

/// Activation metadata attached to an ordinary implementation class.
///
/// Mirrors the activate marker of the descriptor model: the groups the
/// implementation is default-on for, the url keys whose presence activates
/// it, and a relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activate {
    /// Groups this implementation activates under. Empty matches no group
    /// filter only when the caller passes no group.
    pub groups: Vec<String>,
    /// Url parameter keys whose non-empty presence activates this
    /// implementation. Empty means always active within a matching group.
    pub keys: Vec<String>,
    /// Sort order among activated implementations, ascending.
    pub order: i32,
}

impl Activate {
    /// Create empty activation metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one group, builder style.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Add one url key, builder style.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Set the sort order, builder style.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// Last dot-separated segment of a fully-qualified name.
pub(crate) fn simple_name(fully_qualified: &str) -> &str {
    fully_qualified
        .rsplit('.')
        .next()
        .unwrap_or(fully_qualified)
}

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

//! Extension runtime for the Graft RPC framework.
//!
//! Given a capability contract (an object-safe trait declared as an
//! extension point) and a selector — a name, or a url-like parameter bag —
//! the runtime returns a usable implementation, wired with its declared
//! dependencies and wrapped with every registered decorator.
//!
//! - **Discovery**: implementations are named in descriptor resources under
//!   classpath-like roots ([`ClassPath`]), de-duplicated across vendor
//!   namespaces.
//! - **Wrappers**: decorator classes whose constructor takes the contract
//!   itself transparently wrap every constructed instance, in discovery
//!   order.
//! - **Injection**: setter-style dependencies are resolved through the
//!   [`ObjectFactory`] contract, itself an extension point.
//! - **Adaptive dispatch**: each contract can front a single proxy that
//!   picks a concrete implementation per operation from url parameters.
//!
//! The entry point is [`loader_for`], which returns the process-wide loader
//! of a contract:
//!
//! ```ignore
//! let loader = graft_core::loader_for::<dyn Greeter>();
//! let greeter = loader.get("en")?;
//! let adaptive = loader.get_adaptive()?;
//! ```
//!
//! The runtime performs no remote I/O and keeps no state across processes;
//! transports, codecs and RPC invocation build on top of it.

mod activate;
mod adaptive;
mod class;
mod classpath;
mod descriptor;
mod error;
mod factory;
mod holder;
mod inject;
mod loader;
mod point;
mod pool;
mod registry;
mod url;

#[cfg(test)]
mod tests;

pub use adaptive::PROTOCOL_KEY;
pub use class::{ApplyFn, ClassKind, ConstructFn, ExtensionClass, FetchFn, SetterDef, WrapFn};
pub use classpath::{ClassPath, ClassPathConfig, ResourceRoot};
pub use error::{ExtensionError, Result};
pub use factory::{AdaptiveObjectFactory, DependencyRequest, ObjectFactory, SpiObjectFactory};
pub use loader::{loader_for, reset_loader_for, ExtensionLoader, TRUE_SENTINEL};
pub use point::{Activate, Extension, ExtensionPoint};
pub use pool::ClassPool;
pub use url::Url;

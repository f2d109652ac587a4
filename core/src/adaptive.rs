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

//! The adaptive dispatcher.
//!
//! At most one adaptive instance exists per contract: either the registered
//! adaptive class, or the proxy the contract synthesises at build time
//! through [`crate::point::ExtensionPoint::synthesize`]. Each adaptive
//! operation resolves its delegate per call: the operation's keys are read
//! from the url in order, the special `protocol` key reads the protocol
//! field, the first non-empty value names the delegate, and the contract's
//! default name backstops an empty read. A failed build is cached and
//! re-raised on every later access without retrying.

use std::sync::Arc;

use crate::class::ClassKind;
use crate::error::{ExtensionError, Result};
use crate::inject::inject_setters;
use crate::loader::{loader_for, ExtensionLoader};
use crate::point::ExtensionPoint;
use crate::url::Url;

/// The key naming the protocol selector, read from the url's protocol field
/// rather than its parameter bag.
pub const PROTOCOL_KEY: &str = "protocol";

impl<T: ExtensionPoint + ?Sized> ExtensionLoader<T> {
    /// The adaptive instance of the contract, built at most once.
    ///
    /// The first failure is recorded and every subsequent call raises the
    /// recorded error without repeating the build.
    pub fn get_adaptive(&self) -> Result<Arc<T>> {
        if let Some(instance) = self.registry().loaded_adaptive() {
            return Ok(instance);
        }
        if let Some(error) = self.registry().adaptive_error() {
            return Err(error);
        }

        let _guard = self.registry().adaptive_build_guard();
        if let Some(instance) = self.registry().loaded_adaptive() {
            return Ok(instance);
        }
        if let Some(error) = self.registry().adaptive_error() {
            return Err(error);
        }

        match self.build_adaptive() {
            Ok(instance) => {
                self.registry().publish_adaptive(instance.clone());
                Ok(instance)
            }
            Err(e) => {
                let error = match e {
                    already @ ExtensionError::AdaptiveBuild { .. } => already,
                    other => ExtensionError::adaptive_build(T::POINT_NAME, other.to_string()),
                };
                self.registry().set_adaptive_error(error.clone());
                Err(error)
            }
        }
    }

    /// Resolve the delegate of one adaptive operation.
    ///
    /// Used by registered adaptive classes and synthesised proxies alike:
    /// keys are tried in the operation's declared order, the first non-empty
    /// url value wins, and the contract's default name is the fallback.
    pub fn adaptive_target(&self, url: &Url, keys: &[&str]) -> Result<Arc<T>> {
        let mut selected = None;
        for key in keys {
            let value = if *key == PROTOCOL_KEY {
                Some(url.protocol())
            } else {
                url.parameter(key)
            };
            if let Some(value) = value {
                if !value.is_empty() {
                    selected = Some(value.to_string());
                    break;
                }
            }
        }

        let name = match selected {
            Some(name) => name,
            None => self
                .default_name()?
                .ok_or_else(|| ExtensionError::NoAdaptiveTarget {
                    point: T::POINT_NAME.to_string(),
                    keys: keys.join(", "),
                })?,
        };
        self.get(&name)
    }

    fn build_adaptive(&self) -> Result<Arc<T>> {
        let table = self.registry().classes()?;
        let adaptive_class = table
            .read()
            .expect("class table poisoned")
            .adaptive_class();

        let boxed = match adaptive_class {
            Some(class) => {
                let ClassKind::Adaptive(construct) = class.kind() else {
                    return Err(ExtensionError::adaptive_build(
                        T::POINT_NAME,
                        format!("class {} is not adaptive", class.id()),
                    ));
                };
                let mut boxed = construct()?;
                inject_setters(
                    &mut *boxed,
                    class.id(),
                    class.setters(),
                    self.object_factory(),
                );
                boxed
            }
            None => T::synthesize(loader_for::<T>())?,
        };
        Ok(Arc::from(boxed))
    }
}

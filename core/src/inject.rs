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

//! The setter injector.
//!
//! For every enabled setter requirement of an instance, the injector asks
//! the Object Factory for `(collaborator contract, attribute name)` and
//! applies the value when one is produced. A failure in one setter is logged
//! and never prevents the remaining setters from running. The whole pass is
//! skipped when the enclosing loader has no Object Factory, which is exactly
//! the bootstrap case of the factory contract's own loader.

use std::sync::Arc;

use crate::class::SetterDef;
use crate::factory::{DependencyRequest, ObjectFactory};
use crate::point::ExtensionPoint;

/// Run the injection pass over one freshly constructed instance.
pub(crate) fn inject_setters<T: ExtensionPoint + ?Sized>(
    instance: &mut T,
    class_id: &str,
    setters: &[SetterDef],
    factory: Option<&Arc<dyn ObjectFactory>>,
) {
    let Some(factory) = factory else {
        return;
    };
    for setter in setters {
        if setter.disabled {
            continue;
        }
        let request = DependencyRequest {
            contract: setter.contract,
            attribute: setter.attribute,
            fetch: setter.fetch,
        };
        match factory.create(&request) {
            Ok(Some(value)) => {
                if let Err(e) = (setter.apply)(T::as_any_mut(instance), value) {
                    log::error!(
                        "Failed to inject attribute '{}' of {}: {}",
                        setter.attribute,
                        class_id,
                        e
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!(
                    "Failed to resolve attribute '{}' ({}) of {}: {}",
                    setter.attribute,
                    setter.contract,
                    class_id,
                    e
                );
            }
        }
    }
}

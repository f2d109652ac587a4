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

//! Error types for the extension runtime.
//!
//! Every public operation returns `crate::error::Result<T>` with a structured
//! [`ExtensionError`] variant. Errors are `Clone` on purpose: descriptor-line
//! failures are captured in the registry and replayed later when a caller asks
//! for a name that never materialised, and a failed adaptive build is cached
//! and re-raised on every subsequent access.

use thiserror::Error;

/// Main error type for extension runtime operations.
#[derive(Error, Debug, Clone)]
pub enum ExtensionError {
    /// A public operation was called with an unusable argument.
    #[error("Invalid argument: {message}")]
    Usage {
        /// Description of the bad argument
        message: String,
    },

    /// The requested name resolved to no implementation class.
    ///
    /// The message aggregates every per-line failure captured while scanning
    /// descriptor resources for the contract, so a typo'd implementation id
    /// surfaces here rather than being silently dropped at discovery time.
    #[error("No such extension '{name}' for extension point '{point}'{causes}")]
    NoSuchExtension {
        /// The extension point name
        point: String,
        /// The requested extension name
        name: String,
        /// Pre-rendered list of captured per-line causes, possibly empty
        causes: String,
    },

    /// Two different classes compete for the same extension name.
    #[error("Duplicate extension name '{name}' for extension point '{point}': {existing} and {incoming}")]
    DuplicateName {
        point: String,
        name: String,
        existing: String,
        incoming: String,
    },

    /// Two different classes are both marked adaptive for one contract.
    #[error("More than one adaptive class for extension point '{point}': {existing} and {incoming}")]
    DuplicateAdaptive {
        point: String,
        existing: String,
        incoming: String,
    },

    /// A contract declares more than one default extension name.
    #[error("More than one default extension name for extension point '{point}': {names}")]
    DefaultNameConflict {
        point: String,
        names: String,
    },

    /// An implementation id named in a descriptor is not registered in the
    /// class pool.
    #[error("Implementation class not found: {id}")]
    ClassNotFound {
        id: String,
    },

    /// An implementation id resolved to a class registered for a different
    /// contract.
    #[error("Class {id} is not assignable to extension point '{point}' (registered for '{actual}')")]
    NotAssignable {
        point: String,
        id: String,
        actual: String,
    },

    /// A descriptor entry without an explicit name whose derived name is empty.
    #[error("No extension name for class {id} of extension point '{point}'")]
    MissingName {
        point: String,
        id: String,
    },

    /// One descriptor line failed to parse or load.
    #[error("Failed to load extension class (extension point: {point}, line: {line}): {cause}")]
    Descriptor {
        point: String,
        line: String,
        cause: String,
    },

    /// Instantiation, wrapping, or a fatal injection step failed for a name.
    #[error("Extension instance (name: {name}, extension point: {point}) could not be created: {reason}")]
    Construction {
        point: String,
        name: String,
        reason: String,
    },

    /// Building the adaptive instance failed. This error is cached by the
    /// loader and re-raised without retrying the build.
    #[error("Failed to create adaptive instance for extension point '{point}': {reason}")]
    AdaptiveBuild {
        point: String,
        reason: String,
    },

    /// An adaptive operation found no target: none of its keys carried a
    /// non-empty value and the contract has no default name.
    #[error("Failed to resolve an extension for point '{point}': no value for keys [{keys}] in url and no default name")]
    NoAdaptiveTarget {
        point: String,
        keys: String,
    },

    /// An operation on an adaptive proxy that carries no adaptive keys.
    #[error("Operation '{operation}' of extension point '{point}' is not adaptive")]
    UnsupportedOperation {
        point: String,
        operation: String,
    },

    /// Administrative registration for a name that already exists.
    #[error("Extension name '{name}' already exists for extension point '{point}'")]
    AlreadyExists {
        point: String,
        name: String,
    },

    /// Administrative replacement of a name that does not exist.
    #[error("Extension name '{name}' is not registered for extension point '{point}'")]
    NotRegistered {
        point: String,
        name: String,
    },

    /// A value produced during injection did not have the expected type.
    #[error("Injection of attribute '{attribute}' on {id} failed: {reason}")]
    Injection {
        id: String,
        attribute: String,
        reason: String,
    },
}

impl ExtensionError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        ExtensionError::Usage {
            message: message.into(),
        }
    }

    /// Create a construction error for a named extension.
    pub fn construction(
        point: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ExtensionError::Construction {
            point: point.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an adaptive build error.
    pub fn adaptive_build(point: impl Into<String>, reason: impl Into<String>) -> Self {
        ExtensionError::AdaptiveBuild {
            point: point.into(),
            reason: reason.into(),
        }
    }

    /// Create an injection error.
    pub fn injection(
        id: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ExtensionError::Injection {
            id: id.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for extension runtime operations.
pub type Result<T> = std::result::Result<T, ExtensionError>;

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

//! Resource roots for descriptor discovery.
//!
//! Descriptor resources live under classpath-like roots. Two kinds exist: a
//! directory on the filesystem (the plugin-directory scanning model) and a
//! static in-memory table (the analogue of resources embedded in a packaged
//! archive — the runtime's own internal descriptors ship this way). Several
//! roots may each contribute a resource at the same path; the scanner reads
//! them all, in root registration order.

use std::fs;
use std::path::PathBuf;
use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};

/// One classpath-like root that may contain descriptor resources.
#[derive(Debug, Clone)]
pub enum ResourceRoot {
    /// A directory on disk; resources are files under it.
    Dir(PathBuf),
    /// A static table of `(resource path, contents)` pairs.
    Static(&'static [(&'static str, &'static str)]),
}

impl ResourceRoot {
    /// Read the resource at `path` from this root, if present.
    ///
    /// Returns `(origin, contents)`. I/O failures are logged and treated as
    /// absence so one unreadable root never aborts a scan.
    fn read(&self, path: &str) -> Option<(String, String)> {
        match self {
            ResourceRoot::Dir(dir) => {
                let file = dir.join(path);
                if !file.is_file() {
                    return None;
                }
                match fs::read_to_string(&file) {
                    Ok(contents) => Some((file.display().to_string(), contents)),
                    Err(e) => {
                        log::error!(
                            "Exception occurred when reading descriptor resource {}: {}",
                            file.display(),
                            e
                        );
                        None
                    }
                }
            }
            ResourceRoot::Static(entries) => entries
                .iter()
                .find(|(p, _)| *p == path)
                .map(|(p, contents)| (format!("static:{}", p), contents.to_string())),
        }
    }
}

/// Host-facing configuration for the classpath.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassPathConfig {
    /// Directory roots to scan for descriptor resources, in order.
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
}

/// The ordered set of resource roots descriptor scanning reads from.
pub struct ClassPath {
    roots: RwLock<Vec<ResourceRoot>>,
}

static CLASSPATH: OnceLock<ClassPath> = OnceLock::new();

impl ClassPath {
    /// The process-wide classpath.
    pub fn global() -> &'static ClassPath {
        CLASSPATH.get_or_init(|| ClassPath {
            roots: RwLock::new(Vec::new()),
        })
    }

    /// Append a directory root.
    pub fn add_dir(&self, dir: impl Into<PathBuf>) {
        self.add_root(ResourceRoot::Dir(dir.into()));
    }

    /// Append a static root.
    pub fn add_static(&self, entries: &'static [(&'static str, &'static str)]) {
        self.add_root(ResourceRoot::Static(entries));
    }

    /// Append one root.
    pub fn add_root(&self, root: ResourceRoot) {
        self.roots.write().expect("classpath poisoned").push(root);
    }

    /// Append every directory root named by a host configuration.
    pub fn apply_config(&self, config: &ClassPathConfig) {
        for dir in &config.dirs {
            self.add_dir(dir.clone());
        }
    }

    /// Read every resource present at `path`, across all roots in order.
    pub(crate) fn read_all(&self, path: &str) -> Vec<(String, String)> {
        let roots = self.roots.read().expect("classpath poisoned");
        roots.iter().filter_map(|root| root.read(path)).collect()
    }
}

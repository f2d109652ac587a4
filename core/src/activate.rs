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

//! The activation selector.
//!
//! Given a url, an array of explicit names and an optional group, produce
//! the ordered list of activated instances: first the default-activated
//! implementations whose activate metadata matches the group and url keys,
//! sorted by order then primary name, then the explicitly named ones in
//! caller order — with `default` marking the splice point and `-name`
//! entries excluding implementations outright.

use std::sync::Arc;

use crate::error::Result;
use crate::loader::ExtensionLoader;
use crate::point::ExtensionPoint;
use crate::url::Url;

/// The literal marking the default-activated list's position among explicit
/// names.
const DEFAULT_KEY: &str = "default";

/// Prefix excluding a name (or `default`) from activation.
const REMOVE_PREFIX: char = '-';

impl<T: ExtensionPoint + ?Sized> ExtensionLoader<T> {
    /// The activated instances for a url, explicit names and group.
    ///
    /// The result is deterministic for equal inputs and registry state;
    /// per-extension failures surface exactly as `get(name)` would raise
    /// them.
    pub fn get_activated(&self, url: &Url, values: &[&str], group: Option<&str>) -> Result<Vec<Arc<T>>> {
        let names: Vec<&str> = values.to_vec();
        let mut activated: Vec<Arc<T>> = Vec::new();

        let default_removed = names.iter().any(|n| {
            n.strip_prefix(REMOVE_PREFIX)
                .is_some_and(|rest| rest == DEFAULT_KEY)
        });
        if !default_removed {
            let table = self.registry().classes()?;
            let mut matched: Vec<(i32, String)> = {
                let table = table.read().expect("class table poisoned");
                table
                    .activates()
                    .iter()
                    .filter(|(name, activate)| {
                        group_matches(group, &activate.groups)
                            && !names.iter().any(|n| *n == name.as_str())
                            && !names
                                .iter()
                                .any(|n| n.strip_prefix(REMOVE_PREFIX) == Some(name.as_str()))
                            && keys_active(&activate.keys, url)
                    })
                    .map(|(name, activate)| (activate.order, name.clone()))
                    .collect()
            };
            matched.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            for (_, name) in matched {
                activated.push(self.get(&name)?);
            }
        }

        let mut explicit: Vec<Arc<T>> = Vec::new();
        for name in &names {
            if name.starts_with(REMOVE_PREFIX)
                || names
                    .iter()
                    .any(|n| n.strip_prefix(REMOVE_PREFIX) == Some(*name))
            {
                continue;
            }
            if *name == DEFAULT_KEY {
                if !explicit.is_empty() {
                    // Splice the explicit instances so far before the
                    // default-activated list.
                    let tail = std::mem::replace(&mut activated, explicit.drain(..).collect());
                    activated.extend(tail);
                }
            } else {
                explicit.push(self.get(name)?);
            }
        }
        activated.extend(explicit);
        Ok(activated)
    }

    /// Activation keyed by one url parameter: its comma-separated value is
    /// the explicit names array.
    pub fn get_activated_by_key(
        &self,
        url: &Url,
        key: &str,
        group: Option<&str>,
    ) -> Result<Vec<Arc<T>>> {
        let value = url.parameter(key).unwrap_or("");
        let values: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        self.get_activated(url, &values, group)
    }
}

/// An empty caller group matches every implementation; otherwise the caller
/// group must appear among the activate groups.
fn group_matches(group: Option<&str>, groups: &[String]) -> bool {
    match group {
        None => true,
        Some(g) if g.is_empty() => true,
        Some(g) => groups.iter().any(|candidate| candidate == g),
    }
}

/// A key activates when a url parameter named by it, or suffixed `".{key}"`,
/// carries a non-empty value. No keys means active by default.
fn keys_active(keys: &[String], url: &Url) -> bool {
    if keys.is_empty() {
        return true;
    }
    keys.iter().any(|key| {
        url.parameters().any(|(k, v)| {
            (k == key || k.ends_with(&format!(".{}", key))) && !v.is_empty()
        })
    })
}

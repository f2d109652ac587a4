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

//! One-shot lazy slot.
//!
//! A [`Holder`] moves through three states: empty, initialising (exactly one
//! thread, holding the slot mutex), filled. Once filled it is readable
//! without synchronisation. A failed initialisation leaves the slot empty so
//! a later caller may retry; callers that need sticky failures cache the
//! error themselves.

use std::sync::{Mutex, OnceLock};

pub(crate) struct Holder<V> {
    cell: OnceLock<V>,
    init: Mutex<()>,
}

impl<V> Holder<V> {
    pub(crate) fn new() -> Self {
        Holder {
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The published value, if any. Never blocks.
    pub(crate) fn get(&self) -> Option<&V> {
        self.cell.get()
    }

    /// Check, lock the slot, re-check, initialise, publish.
    ///
    /// Only the initialising thread runs `init`; concurrent callers block on
    /// the slot mutex until publication and then observe the same value.
    pub(crate) fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> std::result::Result<V, E>,
    ) -> std::result::Result<&V, E> {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let _guard = self.init.lock().expect("holder mutex poisoned");
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let value = init()?;
        Ok(self.cell.get_or_init(|| value))
    }
}

impl<V> Default for Holder<V> {
    fn default() -> Self {
        Self::new()
    }
}

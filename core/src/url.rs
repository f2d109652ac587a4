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

//! The request-scoped parameter bag consumed by the runtime.
//!
//! Full URL parsing, address handling and serialization belong to higher
//! layers. The runtime only reads the protocol field and the parameter map:
//! the adaptive dispatcher extracts selector keys from here, and the
//! activation selector checks key presence against it.

use std::collections::BTreeMap;
use std::fmt;

/// An opaque, request-scoped bag of selector parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    protocol: String,
    parameters: BTreeMap<String, String>,
}

impl Url {
    /// Create a url with the given protocol and no parameters.
    pub fn new(protocol: impl Into<String>) -> Self {
        Url {
            protocol: protocol.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add one parameter, builder style.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// The protocol field.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Look up one parameter. Absent keys return `None`.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(|v| v.as_str())
    }

    /// Look up `"{method}.{key}"`, falling back to the plain key, falling
    /// back to the supplied default. Empty values count as absent.
    pub fn method_parameter<'a>(&'a self, method: &str, key: &str, default: &'a str) -> &'a str {
        let scoped = format!("{}.{}", method, key);
        if let Some(v) = self.parameters.get(&scoped) {
            if !v.is_empty() {
                return v;
            }
        }
        match self.parameters.get(key) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        }
    }

    /// Iterate all `(key, value)` pairs in key order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://?", self.protocol)?;
        let mut first = true;
        for (k, v) in self.parameters() {
            if !first {
                write!(f, "&")?;
            }
            write!(f, "{}={}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_lookup() {
        let url = Url::new("dubbo").with_parameter("greeter", "fr");
        assert_eq!(url.protocol(), "dubbo");
        assert_eq!(url.parameter("greeter"), Some("fr"));
        assert_eq!(url.parameter("missing"), None);
    }

    #[test]
    fn test_method_parameter_fallback() {
        let url = Url::new("dubbo")
            .with_parameter("greet.timeout", "100")
            .with_parameter("timeout", "500");
        assert_eq!(url.method_parameter("greet", "timeout", "0"), "100");
        assert_eq!(url.method_parameter("other", "timeout", "0"), "500");
        assert_eq!(url.method_parameter("other", "retries", "2"), "2");
    }

    #[test]
    fn test_display_lists_parameters() {
        let url = Url::new("dubbo")
            .with_parameter("a", "1")
            .with_parameter("b", "2");
        assert_eq!(url.to_string(), "dubbo://?a=1&b=2");
    }
}

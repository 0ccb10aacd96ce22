//! Header lists in the platform's wire shape.
//!
//! The platform keys headers by lower-cased name and wraps each value in a list
//! so repeated headers survive. Only the first entry is ever read or written here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::markers::HeaderName;

/// One header instance: canonical spelling plus value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lower-cased header name to its instances.
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

/// Accessors over [`Headers`] keyed by the shared header schema.
pub trait HeadersExt {
    /// Value of the first instance. An empty instance list counts as absent.
    fn first_value(&self, header: HeaderName) -> Option<&str>;

    /// Replace every instance of `header` with a single entry.
    fn set(&mut self, header: HeaderName, value: impl Into<String>);

    /// Drop every instance of `header`. Returns whether any were present.
    fn unset(&mut self, header: HeaderName) -> bool;
}

impl HeadersExt for Headers {
    fn first_value(&self, header: HeaderName) -> Option<&str> {
        self.get(header.name)
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }

    fn set(&mut self, header: HeaderName, value: impl Into<String>) {
        self.insert(
            header.name.to_string(),
            vec![HeaderEntry::new(header.key, value)],
        );
    }

    fn unset(&mut self, header: HeaderName) -> bool {
        self.remove(header.name).is_some()
    }
}

use std::collections::BTreeMap;

use crate::value::Value;

/// Exposes fields by name, so typed values can be sorted by a key chosen at runtime.
pub trait Attributes {
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Resolves a dotted path: the first segment through `attribute`, the rest on the
    /// resulting value.
    fn lookup(&self, path: &str) -> Option<Value> {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };

        let value = self.attribute(first)?;

        match rest {
            Some(rest) => value.get_path(rest).cloned(),
            None => Some(value),
        }
    }
}

impl Attributes for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn lookup(&self, path: &str) -> Option<Value> {
        self.get_path(path).cloned()
    }
}

impl Attributes for BTreeMap<String, Value> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

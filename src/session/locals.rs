//! Local alias table backing `%name` tokens
//!
//! Aliases are operator-chosen names for plain integers. They are never
//! removed; setting an existing name overwrites its value in place and keeps
//! its original listing position.

use super::errors::AddressError;
use rustc_hash::FxHashMap;

/// Check if `name` can be used as an alias.
///
/// Names are case-sensitive identifiers made of ASCII letters, digits and
/// underscores. `#` is reserved for the last-result slot.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip an optional leading `%` and check the rest is a valid name
pub fn normalize_name(name: &str) -> Result<&str, AddressError> {
    let bare = name.strip_prefix('%').unwrap_or(name);
    if is_valid_name(bare) {
        Ok(bare)
    } else {
        Err(AddressError::InvalidSyntax {
            token: name.to_string(),
            reason: "local names use letters, digits and '_'",
        })
    }
}

/// Name -> value mapping with insertion-ordered listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTable {
    values: FxHashMap<String, u64>,
    insertion_order: Vec<String>, // Track order of first definition
}

impl LocalTable {
    pub fn new() -> Self {
        LocalTable {
            values: FxHashMap::default(),
            insertion_order: Vec::new(),
        }
    }

    /// Define or overwrite an alias, returning the previous value
    pub fn set(&mut self, name: &str, value: u64) -> Option<u64> {
        let previous = self.values.insert(name.to_string(), value);
        if previous.is_none() {
            self.insertion_order.push(name.to_string());
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Aliases in the order they were first defined
    pub fn list(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.insertion_order
            .iter()
            .filter_map(|name| self.values.get(name).map(|&v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_keeps_position() {
        let mut locals = LocalTable::new();
        assert_eq!(locals.set("foo", 1), None);
        assert_eq!(locals.set("bar", 2), None);
        assert_eq!(locals.set("foo", 3), Some(1));

        let listed: Vec<_> = locals.list().collect();
        assert_eq!(listed, vec![("foo", 3), ("bar", 2)]);
        assert_eq!(locals.len(), 2);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut locals = LocalTable::new();
        locals.set("Foo", 1);
        assert_eq!(locals.get("Foo"), Some(1));
        assert_eq!(locals.get("foo"), None);
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("buf_1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("#"));
        assert!(!is_valid_name("a-b"));
        assert!(!is_valid_name("%x"));
        assert_eq!(normalize_name("%x"), Ok("x"));
        assert!(normalize_name("%%x").is_err());
    }
}

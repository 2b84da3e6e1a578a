//! Name-keyed plugin registries.
//!
//! A registry maps names to factories and remembers the order in which they
//! were added. That order is what "run all providers" walks, so storage is a
//! plain vector of pairs rather than a hash map.

use crate::error::RegistryError;

/// Contract shared by the command, provider and formatter registries.
pub trait Registry {
    type Factory: 'static;

    /// Register `factory` under `name`.
    ///
    /// Fails with [`RegistryError::DuplicateName`] if the name is taken; the
    /// earlier registration is left untouched.
    fn add(&mut self, name: impl Into<String>, factory: Self::Factory) -> Result<(), RegistryError>;

    fn get(&self, name: &str) -> Result<&Self::Factory, RegistryError>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Entries in insertion order. Every call starts a fresh traversal.
    fn iter(&self) -> Iter<'_, Self::Factory>;
}

/// Insertion-ordered storage behind every concrete registry.
#[derive(Clone)]
pub struct OrderedRegistry<F> {
    kind: &'static str,
    entries: Vec<(String, F)>,
}

impl<F> OrderedRegistry<F> {
    /// `kind` only shows up in error messages ("command", "provider", ...).
    pub fn with_kind(kind: &'static str) -> Self {
        Self { kind, entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }
}

impl<F: 'static> Registry for OrderedRegistry<F> {
    type Factory = F;

    fn add(&mut self, name: impl Into<String>, factory: F) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.iter().any(|(existing, _)| *existing == name) {
            return Err(RegistryError::DuplicateName { kind: self.kind, name });
        }

        tracing::trace!(kind = self.kind, %name, "registered");
        self.entries.push((name, factory));
        Ok(())
    }

    fn get(&self, name: &str) -> Result<&F, RegistryError> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, factory)| factory)
            .ok_or_else(|| RegistryError::NotFound { kind: self.kind, name: name.to_string() })
    }

    fn iter(&self) -> Iter<'_, F> {
        Iter { inner: self.entries.iter() }
    }
}

impl<F> std::fmt::Debug for OrderedRegistry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedRegistry")
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

impl<'a, F: 'static> IntoIterator for &'a OrderedRegistry<F> {
    type Item = (&'a str, &'a F);
    type IntoIter = Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over `(name, factory)` pairs.
pub struct Iter<'a, F> {
    inner: std::slice::Iter<'a, (String, F)>,
}

impl<'a, F> Iterator for Iter<'a, F> {
    type Item = (&'a str, &'a F);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, factory)| (name.as_str(), factory))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<F> ExactSizeIterator for Iter<'_, F> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    type Factory = Arc<dyn Fn() -> u32 + Send + Sync>;

    fn factory(value: u32) -> Factory {
        Arc::new(move || value)
    }

    #[test]
    fn get_returns_the_exact_factory_that_was_added() {
        let mut registry = OrderedRegistry::with_kind("test");
        let first = factory(1);
        let second = factory(2);

        registry.add("first", Arc::clone(&first)).unwrap();
        registry.add("second", Arc::clone(&second)).unwrap();

        assert!(Arc::ptr_eq(registry.get("first").unwrap(), &first));
        assert!(Arc::ptr_eq(registry.get("second").unwrap(), &second));
        assert_eq!((registry.get("second").unwrap())(), 2);
    }

    #[test]
    fn contains_agrees_with_get() {
        let mut registry = OrderedRegistry::with_kind("test");
        registry.add("present", factory(1)).unwrap();

        for name in ["present", "absent", ""] {
            assert_eq!(registry.contains(name), registry.get(name).is_ok(), "name: {name}");
        }
        assert!(registry.contains("present"));
        assert!(!registry.contains("absent"));
    }

    #[test]
    fn missing_name_is_not_found() {
        let registry: OrderedRegistry<Factory> = OrderedRegistry::with_kind("provider");
        let err = registry.get("rp5").err().unwrap();

        assert_eq!(err, RegistryError::NotFound { kind: "provider", name: "rp5".into() });
    }

    #[test]
    fn duplicate_name_is_rejected_and_first_registration_kept() {
        let mut registry = OrderedRegistry::with_kind("command");
        let original = factory(1);
        registry.add("list", Arc::clone(&original)).unwrap();

        let err = registry.add("list", factory(2)).unwrap_err();

        assert_eq!(err, RegistryError::DuplicateName { kind: "command", name: "list".into() });
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(registry.get("list").unwrap(), &original));
    }

    #[test]
    fn iteration_follows_insertion_order_and_restarts() {
        let mut registry = OrderedRegistry::with_kind("test");
        for (i, name) in ["rp5", "accu", "sinoptik"].into_iter().enumerate() {
            registry.add(name, factory(i as u32)).unwrap();
        }

        let pass = |r: &OrderedRegistry<Factory>| {
            r.iter().map(|(name, f)| (name.to_string(), f())).collect::<Vec<_>>()
        };

        let expected = vec![("rp5".to_string(), 0), ("accu".to_string(), 1), ("sinoptik".to_string(), 2)];
        assert_eq!(pass(&registry), expected);
        assert_eq!(pass(&registry), expected);
        assert_eq!(registry.iter().len(), 3);
        assert_eq!(registry.names(), vec!["rp5", "accu", "sinoptik"]);
    }
}

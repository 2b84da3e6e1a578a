use thiserror::Error;

/// Errors raised by a [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A second factory was registered under a name that is already taken.
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} '{name}' is not registered")]
    NotFound { kind: &'static str, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_registry_kind() {
        let dup = RegistryError::DuplicateName { kind: "provider", name: "accu".into() };
        assert_eq!(dup.to_string(), "provider 'accu' is already registered");

        let missing = RegistryError::NotFound { kind: "command", name: "list".into() };
        assert_eq!(missing.to_string(), "command 'list' is not registered");
    }
}

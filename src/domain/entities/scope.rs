//! Visibility filter applied to registry and analytics queries.

use serde::Serialize;

/// Opaque visibility filter. Only affects which records are visible, never ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Scope {
    #[default]
    All,
    Owner(String),
}

impl Scope {
    /// Builds a scope from an optional owner identity; `None` sees everything.
    pub fn from_owner(owner: Option<String>) -> Self {
        match owner {
            Some(owner) if !owner.is_empty() => Scope::Owner(owner),
            _ => Scope::All,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match self {
            Scope::All => None,
            Scope::Owner(owner) => Some(owner),
        }
    }

    pub fn allows(&self, owner: Option<&str>) -> bool {
        match self {
            Scope::All => true,
            Scope::Owner(expected) => owner == Some(expected.as_str()),
        }
    }
}

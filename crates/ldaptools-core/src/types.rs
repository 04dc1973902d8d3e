//! Identifier kinds and pools.
//!
//! POSIX accounts carry numeric user and group identifiers. New identifiers are drawn from a
//! configured half-open range per kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Lower bound (inclusive) of the fallback identifier pool.
pub const DEFAULT_MIN_ID: u32 = 2000;
/// Upper bound (exclusive) of the fallback identifier pool.
pub const DEFAULT_MAX_ID: u32 = 65545;

/// The kind of numeric identifier being allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// User identifier (`uidNumber`), checked against the passwd database.
    User,
    /// Group identifier (`gidNumber`), checked against the group database.
    Group,
}

impl IdentifierKind {
    /// LDAP attribute that stores this identifier.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::User => "uidNumber",
            Self::Group => "gidNumber",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("UID"),
            Self::Group => f.write_str("GID"),
        }
    }
}

/// Half-open range `[start, end)` of identifiers available for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierPool {
    start: u32,
    end: u32,
}

impl IdentifierPool {
    /// The fallback pool used when no range is configured.
    pub const DEFAULT: Self = Self::new(DEFAULT_MIN_ID, DEFAULT_MAX_ID);

    /// Creates a pool spanning `start..end`.
    ///
    /// A pool with `end <= start` is empty.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// First identifier in the pool.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// First identifier past the end of the pool.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Returns true if the pool holds no identifiers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Iterates the pool in ascending order.
    pub fn iter(&self) -> Range<u32> {
        self.start..self.end
    }
}

impl Default for IdentifierPool {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for IdentifierPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_matches_fallback_range() {
        let pool = IdentifierPool::default();
        assert_eq!(pool.start(), 2000);
        assert_eq!(pool.end(), 65545);
        assert_eq!(pool.iter().next(), Some(2000));
        assert_eq!(pool.iter().last(), Some(65544));
        assert_eq!(pool.to_string(), "[2000, 65545)");
    }

    #[test]
    fn inverted_pool_is_empty() {
        let pool = IdentifierPool::new(10, 10);
        assert!(pool.is_empty());
        assert_eq!(pool.iter().count(), 0);
        assert!(IdentifierPool::new(5, 3).is_empty());
        assert!(!IdentifierPool::new(5, 6).is_empty());
    }

    #[test]
    fn kind_display_and_attribute() {
        assert_eq!(IdentifierKind::User.to_string(), "UID");
        assert_eq!(IdentifierKind::Group.to_string(), "GID");
        assert_eq!(IdentifierKind::User.attribute(), "uidNumber");
        assert_eq!(IdentifierKind::Group.attribute(), "gidNumber");
    }
}

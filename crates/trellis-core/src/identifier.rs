//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type. Category paths such as
//! `aws.compute.Fargate` are looked up on every node creation, so they are
//! interned once and compared as symbols afterwards.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        // The interner is append-only, a poisoned lock still holds valid symbols.
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use trellis_core::identifier::Id;
///
/// let fargate = Id::new("aws.compute.Fargate");
/// assert_eq!(fargate, "aws.compute.Fargate");
/// assert_eq!(fargate, Id::new("aws.compute.Fargate"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the identifier text as an owned string.
    pub fn to_owned_string(&self) -> String {
        interner()
            .resolve(self.0)
            .map(str::to_owned)
            .unwrap_or_default()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_owned_string();
        f.write_str(&value)
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        interner().get(*other).is_some_and(|symbol| symbol == self.0)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self == &other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        let id1 = Id::new("aws.network.ELB");
        let id2 = Id::new("aws.network.ELB");
        let id3 = Id::new("aws.network.VPC");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_display_round_trips_name() {
        let id = Id::new("generic.blank.Blank");
        assert_eq!(id.to_string(), "generic.blank.Blank");
    }

    #[test]
    fn test_compare_with_str() {
        let id = Id::from("onprem.client.User");
        assert_eq!(id, "onprem.client.User");
        assert!(id != "onprem.client.Client");
        assert!(id != "never.interned.anywhere");
    }
}

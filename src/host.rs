//! Content-derived host identity.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::Dependencies;

/// Stable identifier derived from a host's dependency declaration.
///
/// Two hosts that declare the same dependency map, in any key order, get
/// the same id, so repeated registrations reuse one index entry.
///
/// # Derivation
///
/// ```text
/// id = SHA256( for each (name, range) sorted by name:
///                len(name) || name || len(range) || range )
/// ```
///
/// Lengths are 8-byte little-endian, which keeps the encoding unambiguous
/// for names or ranges containing separators. SHA-256 is a fixed, pinned
/// choice, so every registry instance agrees on ids across restarts and
/// platforms. Ids are not a security boundary: nothing relies on its
/// collision resistance.
///
/// # Examples
///
/// ```
/// use component_registry::{Dependencies, HostId};
///
/// let a = Dependencies::from_pairs([("react", "^16.8.0"), ("lodash", "^4.0.0")]);
/// let b = Dependencies::from_pairs([("lodash", "^4.0.0"), ("react", "^16.8.0")]);
///
/// assert_eq!(HostId::identify(&a), HostId::identify(&b));
///
/// let id = HostId::identify(&a);
/// let parsed: HostId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId([u8; 32]);

impl HostId {
    /// Creates a `HostId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the id as bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derives the id for a dependency map.
    ///
    /// An empty map yields the canonical "no dependencies" id.
    #[must_use]
    pub fn identify(dependencies: &Dependencies) -> Self {
        let mut hasher = Sha256::new();
        for (name, range) in dependencies.iter() {
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update((range.len() as u64).to_le_bytes());
            hasher.update(range.as_bytes());
        }

        let result = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }
}

impl fmt::Debug for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostId({self})")
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error returned when a string is not a 64-character hex host id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHostId;

impl fmt::Display for InvalidHostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host id must be 64 hexadecimal characters")
    }
}

impl std::error::Error for InvalidHostId {}

impl FromStr for HostId {
    type Err = InvalidHostId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidHostId);
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| InvalidHostId)?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| InvalidHostId)?;
        }
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for HostId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HostId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Deserialize;
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_is_order_independent() {
        let mut forward = Dependencies::new();
        forward.insert("a", "^1.0.0");
        forward.insert("b", "^2.0.0");

        let mut backward = Dependencies::new();
        backward.insert("b", "^2.0.0");
        backward.insert("a", "^1.0.0");

        assert_eq!(HostId::identify(&forward), HostId::identify(&backward));
    }

    #[test]
    fn different_ranges_produce_different_ids() {
        let one = Dependencies::from_pairs([("react", "^16.0.0")]);
        let two = Dependencies::from_pairs([("react", "^16.1.0")]);
        assert_ne!(HostId::identify(&one), HostId::identify(&two));
    }

    #[test]
    fn boundary_shift_produces_different_ids() {
        let one = Dependencies::from_pairs([("ab", "c")]);
        let two = Dependencies::from_pairs([("a", "bc")]);
        assert_ne!(HostId::identify(&one), HostId::identify(&two));
    }

    #[test]
    fn empty_dependencies_have_a_stable_id() {
        let id = HostId::identify(&Dependencies::new());
        assert_eq!(
            id.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = HostId::identify(&Dependencies::from_pairs([("react", "^16.0.0")]));
        let text = id.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text.parse::<HostId>(), Ok(id));
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert_eq!("unknown".parse::<HostId>(), Err(InvalidHostId));
        assert_eq!("zz".repeat(32).parse::<HostId>(), Err(InvalidHostId));
    }

    #[test]
    fn debug_includes_hex() {
        let id = HostId::from_bytes([0xab; 32]);
        let debug = format!("{id:?}");
        assert!(debug.starts_with("HostId(abab"));
    }
}

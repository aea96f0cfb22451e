use derive_more::{Display, FromStr};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

///
/// Ulid
///
/// Canonical primary-key type: lexicographically sortable, unique,
/// stable for the lifetime of a row.
///
/// Serialized in its 26-character Crockford base32 text form so that
/// stored rows stay human-readable.
///

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ulid(ulid::Ulid);

impl Ulid {
    /// Generate a new random Ulid.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Construct a Ulid from a raw u128, mostly useful for deterministic
    /// fixtures.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(ulid::Ulid(value))
    }

    #[must_use]
    pub const fn to_u128(self) -> u128 {
        self.0.0
    }
}

impl Serialize for Ulid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ulid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

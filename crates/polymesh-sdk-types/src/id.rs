//! Fixed-size 32-byte identifiers.
//!
//! Identities, accounts and hashes on Polymesh are all 32-byte values. They are
//! displayed as `0x`-prefixed lowercase hex and parsed with or without the prefix.

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of every identifier in this module.
pub const ID_LENGTH: usize = 32;

fn decode_fixed(value: &str) -> TypeResult<[u8; ID_LENGTH]> {
    let stripped = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if stripped.len() != ID_LENGTH * 2 {
        return Err(TypeError::InvalidId(format!(
            "expected {} hex characters, got {}",
            ID_LENGTH * 2,
            stripped.len()
        )));
    }

    let mut bytes = [0u8; ID_LENGTH];
    hex::decode_to_slice(stripped, &mut bytes)?;
    Ok(bytes)
}

macro_rules! fixed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; ID_LENGTH]);

        impl $name {
            /// Creates the value from raw bytes.
            pub const fn new(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Parses a hex string, with or without the `0x` prefix.
            pub fn from_hex(value: &str) -> TypeResult<Self> {
                decode_fixed(value).map(Self)
            }

            /// Convenience constructor that fills every byte with `byte`.
            pub const fn repeat_byte(byte: u8) -> Self {
                Self([byte; ID_LENGTH])
            }

            /// Returns the raw bytes.
            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0
            }

            /// Returns the `0x`-prefixed hex representation.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; ID_LENGTH]> for $name {
            fn from(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_id!(
    /// The identifier of an on-chain identity (DID).
    IdentityId
);

fixed_id!(
    /// A signing key / account address.
    AccountId
);

fixed_id!(
    /// A 32-byte hash, used for extrinsic and block hashes.
    H256
);

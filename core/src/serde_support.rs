// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

/// Implements `Display`, `FromStr`, `Serialize` and `Deserialize` for a
/// fixed-size type implementing [`dusk_bytes::Serializable`], using its hex
/// representation. The `0x` prefix is optional when parsing.
macro_rules! impl_hex_string {
    ($ty:ty, $size:literal, $prefix:literal) => {
        impl core::fmt::Display for $ty {
            fn fmt(
                &self,
                f: &mut core::fmt::Formatter<'_>,
            ) -> core::fmt::Result {
                use dusk_bytes::Serializable;
                write!(f, "{}{}", $prefix, hex::encode(self.to_bytes()))
            }
        }

        impl core::fmt::Debug for $ty {
            fn fmt(
                &self,
                f: &mut core::fmt::Formatter<'_>,
            ) -> core::fmt::Result {
                core::fmt::Display::fmt(self, f)
            }
        }

        impl core::str::FromStr for $ty {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                use dusk_bytes::DeserializableSlice;
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s)?;
                if bytes.len() != $size {
                    return Err(crate::Error::BadLength(bytes.len(), $size));
                }
                Ok(Self::from_slice(&bytes)?)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let s =
                    <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_hex_string;

/// Serializes amounts as decimal strings, since neither JSON numbers nor TOML
/// integers can hold every `u128`.
///
/// Use with `#[serde(with = "forger_core::amount")]`.
pub mod amount {
    use serde::de::{Error as SerdeError, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::Amount;

    /// Serialize an amount as a decimal string.
    ///
    /// # Errors
    /// Fails only if the serializer does.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(
        value: &Amount,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Deserialize an amount from a decimal string.
    ///
    /// # Errors
    /// If the string is empty or is not a valid `u128`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Amount, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(SerdeError::invalid_value(
                Unexpected::Str(&s),
                &"a non-empty string",
            ));
        }
        s.parse::<Amount>().map_err(|e| {
            SerdeError::custom(format!("failed to deserialize amount: {e}"))
        })
    }
}

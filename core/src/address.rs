// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use dusk_bytes::Serializable;

use crate::Error;
use crate::serde_support::impl_hex_string;

/// A 20-byte account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of an address in bytes.
    pub const SIZE: usize = 20;

    /// Creates an address from its raw bytes.
    #[must_use]
    pub const fn from_array(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }

    /// Left-pads the address to a 32-byte ABI word.
    #[must_use]
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - Self::SIZE..].copy_from_slice(&self.0);
        word
    }

    /// Reads an address out of a 32-byte ABI word.
    ///
    /// # Errors
    /// If any of the 12 padding bytes is not zero.
    pub fn from_word(word: &[u8; 32]) -> Result<Self, Error> {
        let (padding, bytes) = word.split_at(32 - Self::SIZE);
        if padding.iter().any(|b| *b != 0) {
            return Err(Error::InvalidData);
        }
        let mut address = [0u8; Self::SIZE];
        address.copy_from_slice(bytes);
        Ok(Self(address))
    }
}

impl Serializable<20> for Address {
    type Error = dusk_bytes::Error;

    fn from_bytes(buf: &[u8; 20]) -> Result<Self, Self::Error> {
        Ok(Self(*buf))
    }

    fn to_bytes(&self) -> [u8; 20] {
        self.0
    }
}

impl_hex_string!(Address, 20, "0x");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_and_without_prefix() {
        let with: Address = "0x00000000000000000000000000000000000000ff"
            .parse()
            .expect("address should parse");
        let without: Address = "00000000000000000000000000000000000000ff"
            .parse()
            .expect("address should parse");
        assert_eq!(with, without);
        assert_eq!(with.as_bytes()[19], 0xff);
    }

    #[test]
    fn parse_wrong_length() {
        let err = "0x00ff".parse::<Address>().unwrap_err();
        assert_eq!(err, Error::BadLength(2, 20));
    }

    #[test]
    fn word_padding_is_checked() {
        let address = Address::from_array([7; 20]);
        let mut word = address.to_word();
        assert_eq!(Address::from_word(&word), Ok(address));

        word[0] = 1;
        assert_eq!(Address::from_word(&word), Err(Error::InvalidData));
    }
}

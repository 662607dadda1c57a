// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Public keys authorized to forge by a stake.

use dusk_bytes::Serializable;
use serde::{Deserialize, Serialize};

use crate::serde_support::impl_hex_string;

/// Public key used to sign forged blocks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockSignPublicKey([u8; 32]);

impl BlockSignPublicKey {
    /// Creates a key from its raw bytes.
    #[must_use]
    pub const fn from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serializable<32> for BlockSignPublicKey {
    type Error = dusk_bytes::Error;

    fn from_bytes(buf: &[u8; 32]) -> Result<Self, Self::Error> {
        Ok(Self(*buf))
    }

    fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl_hex_string!(BlockSignPublicKey, 32, "");

/// Compressed public key used to prove slot leadership.
///
/// The first byte is the parity tag of the compressed point and must be
/// either `0x02` or `0x03`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VrfPublicKey([u8; 33]);

impl VrfPublicKey {
    /// Returns the first 32 bytes of the key and its last byte, the way the
    /// key is split across ABI words.
    #[must_use]
    pub fn split(&self) -> ([u8; 32], u8) {
        let mut head = [0u8; 32];
        head.copy_from_slice(&self.0[..32]);
        (head, self.0[32])
    }

    /// Joins the two halves produced by [`VrfPublicKey::split`].
    ///
    /// # Errors
    /// If the resulting key is not well formed.
    pub fn join(head: &[u8; 32], last: u8) -> Result<Self, dusk_bytes::Error> {
        let mut bytes = [0u8; 33];
        bytes[..32].copy_from_slice(head);
        bytes[32] = last;
        Self::from_bytes(&bytes)
    }
}

impl Serializable<33> for VrfPublicKey {
    type Error = dusk_bytes::Error;

    fn from_bytes(buf: &[u8; 33]) -> Result<Self, Self::Error> {
        match buf[0] {
            0x02 | 0x03 => Ok(Self(*buf)),
            _ => Err(dusk_bytes::Error::InvalidData),
        }
    }

    fn to_bytes(&self) -> [u8; 33] {
        self.0
    }
}

impl_hex_string!(VrfPublicKey, 33, "");

/// The pair of keys a stake authorizes to forge.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ForgingKeys {
    /// Block signing key.
    pub block_sign_public_key: BlockSignPublicKey,
    /// VRF key.
    pub vrf_public_key: VrfPublicKey,
}

impl ForgingKeys {
    /// Creates a new pair of forging keys.
    #[must_use]
    pub const fn new(
        block_sign_public_key: BlockSignPublicKey,
        vrf_public_key: VrfPublicKey,
    ) -> Self {
        Self {
            block_sign_public_key,
            vrf_public_key,
        }
    }
}

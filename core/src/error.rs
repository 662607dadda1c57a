// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Error-type for forger-core.

use thiserror::Error;

/// The forger-core error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Dusk-bytes `InvalidData` error
    #[error("invalid data")]
    InvalidData,
    /// Dusk-bytes `BadLength` error
    #[error("bad length: found {0}, expected {1}")]
    BadLength(usize, usize),
    /// Dusk-bytes `InvalidChar` error
    #[error("invalid char {0:?} at index {1}")]
    InvalidChar(char, usize),
    /// The call data does not start with a known method selector.
    #[error("unknown method selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),
    /// An ABI word does not hold a valid value for its type.
    #[error("invalid abi word at offset {0}")]
    InvalidWord(usize),
    /// A log does not carry the expected event.
    #[error("log is not a {0} event")]
    UnexpectedEvent(&'static str),
}

impl From<dusk_bytes::Error> for Error {
    fn from(bytes_error: dusk_bytes::Error) -> Self {
        match bytes_error {
            dusk_bytes::Error::InvalidData => Self::InvalidData,
            dusk_bytes::Error::BadLength { found, expected } => {
                Self::BadLength(found, expected)
            }
            dusk_bytes::Error::InvalidChar { ch, index } => {
                Self::InvalidChar(ch, index)
            }
        }
    }
}

impl From<hex::FromHexError> for Error {
    fn from(hex_error: hex::FromHexError) -> Self {
        match hex_error {
            hex::FromHexError::InvalidHexCharacter { c, index } => {
                Self::InvalidChar(c, index)
            }
            _ => Self::InvalidData,
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::stake::StakeId;
use forger_core::{Address, Amount};
use thiserror::Error;

use crate::host::HostError;

/// Reasons for a call to be reverted.
///
/// A reverted call is still included in the block and pays for its whole gas
/// limit, but leaves no other trace in the state and emits no logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Revert {
    #[error("invalid call data: {0}")]
    InvalidCall(forger_core::Error),
    #[error("call is not payable")]
    NonPayable,
    #[error("{0} is not allowed to own a stake")]
    DisallowedOwner(Address),
    #[error("stake value must be greater than zero")]
    ZeroValue,
    #[error("insufficient balance: {balance} held, {required} required")]
    InsufficientBalance { balance: Amount, required: Amount },
    #[error("stake {0} not found")]
    NotFound(StakeId),
    #[error("{caller} is not the owner of stake {stake_id}")]
    NotOwner { stake_id: StakeId, caller: Address },
    #[error("out of gas")]
    OutOfGas,
}

/// Failures that break the registry's invariants.
///
/// These never occur under a correct host and abort the processing of the
/// whole block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(
        "escrow mismatch: registry holds {held}, stakes amount to {tracked}"
    )]
    EscrowMismatch { held: Amount, tracked: Amount },
    #[error("stake {0} already exists")]
    DuplicateStake(StakeId),
    #[error("stake value overflows the escrow")]
    Overflow,
    #[error("host failure: {0}")]
    Host(#[from] HostError),
}

/// Outcome of a failed operation: either a revert or a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Abort {
    Revert(Revert),
    Fatal(Error),
}

impl From<Revert> for Abort {
    fn from(revert: Revert) -> Self {
        Self::Revert(revert)
    }
}

impl From<Error> for Abort {
    fn from(error: Error) -> Self {
        Self::Fatal(error)
    }
}

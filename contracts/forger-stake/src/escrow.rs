// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Moves funds in and out of the registry's own balance.
//!
//! The registry's balance must always equal the sum of the live stakes. Both
//! operations check it before moving any funds, and the contract checks it
//! again once the ledger is updated.

use forger_core::{Address, Amount, FORGER_STAKE_CONTRACT};
use tracing::error;

use crate::error::{Abort, Error, Revert};
use crate::gas::GasMeter;
use crate::host::{Host, HostError};

/// Fails with [`Error::EscrowMismatch`] if the registry's balance differs
/// from `tracked`.
pub fn verify<H: Host>(host: &H, tracked: Amount) -> Result<(), Error> {
    let held = host.balance(&FORGER_STAKE_CONTRACT);
    if held != tracked {
        error!(event = "escrow mismatch", %held, %tracked);
        return Err(Error::EscrowMismatch { held, tracked });
    }
    Ok(())
}

/// Moves `amount` from `from` into the registry.
///
/// `tracked` is the value of the live stakes before the new stake is
/// inserted. A caller that cannot afford `amount` reverts the call.
pub fn reserve<H: Host>(
    host: &mut H,
    tracked: Amount,
    from: &Address,
    amount: Amount,
    gas: &mut GasMeter,
) -> Result<(), Abort> {
    verify(host, tracked)?;
    gas.charge(gas.schedule().transfer)?;

    host.debit(from, amount).map_err(|e| match e {
        HostError::InsufficientBalance {
            balance, required, ..
        } => Abort::Revert(Revert::InsufficientBalance { balance, required }),
        e => Abort::Fatal(e.into()),
    })?;
    host.credit(&FORGER_STAKE_CONTRACT, amount)
        .map_err(Error::from)?;
    Ok(())
}

/// Moves `amount` out of the registry to `to`.
///
/// `tracked` is the value of the live stakes before the stake is removed.
/// Since the registry's balance covers every stake, any failure here is
/// fatal.
pub fn release<H: Host>(
    host: &mut H,
    tracked: Amount,
    to: &Address,
    amount: Amount,
    gas: &mut GasMeter,
) -> Result<(), Abort> {
    verify(host, tracked)?;
    gas.charge(gas.schedule().transfer)?;

    host.debit(&FORGER_STAKE_CONTRACT, amount)
        .map_err(Error::from)?;
    host.credit(to, amount).map_err(Error::from)?;
    Ok(())
}

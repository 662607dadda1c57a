// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The forger stake registry.
//!
//! A native contract living at [`forger_core::FORGER_STAKE_CONTRACT`],
//! executed by the node against any state implementing [`Host`].

mod contract;
mod error;
mod gas;
mod host;

pub mod escrow;
pub mod ledger;

pub use contract::{CallReceipt, ForgerStakeContract, Message};
pub use error::{Abort, Error, Revert};
pub use gas::{GasMeter, GasSchedule};
pub use host::{Host, HostError, SnapshotId};

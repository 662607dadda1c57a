// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::Epoch;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// The snapshot an epoch depends on has not been taken yet.
    #[error("epoch {0} is not final yet")]
    EpochNotFinal(Epoch),
    /// The snapshot an epoch depends on was dropped.
    #[error("epoch {0} is no longer retained")]
    EpochPruned(Epoch),
    #[error("epoch {epoch} cannot be closed after epoch {last_closed}")]
    EpochOutOfOrder { epoch: Epoch, last_closed: Epoch },
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::Epoch;
use forger_core::stake::{ACTIVATION_DELAY, StakeRecord};
use serde::{Deserialize, Serialize};

/// Effect of a stake on forging eligibility in a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeStatus {
    /// Delegated, but not counted yet.
    Pending,
    /// Counted towards the eligibility of its forging keys.
    Active,
    /// Withdrawn, and no longer counted.
    Retired,
}

impl StakeStatus {
    /// Status in `epoch` of a stake created in `created_epoch` and possibly
    /// withdrawn in `withdrawn_epoch`.
    ///
    /// Both delegation and withdrawal take [`ACTIVATION_DELAY`] epochs to
    /// have an effect.
    pub fn at(
        created_epoch: Epoch,
        withdrawn_epoch: Option<Epoch>,
        epoch: Epoch,
    ) -> Self {
        match withdrawn_epoch {
            Some(w) if epoch >= w.saturating_add(ACTIVATION_DELAY) => {
                Self::Retired
            }
            _ if epoch < created_epoch.saturating_add(ACTIVATION_DELAY) => {
                Self::Pending
            }
            _ => Self::Active,
        }
    }

    pub fn of(
        record: &StakeRecord,
        withdrawn_epoch: Option<Epoch>,
        epoch: Epoch,
    ) -> Self {
        Self::at(record.created_epoch, withdrawn_epoch, epoch)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::BTreeMap;

use forger_core::Amount;
use forger_core::keys::ForgingKeys;
use forger_core::stake::StakeRecord;
use serde::{Deserialize, Serialize};

/// Forging keys allowed to produce blocks in an epoch, with the total stake
/// delegated to each of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Provisioners {
    members: BTreeMap<ForgingKeys, Amount>,
}

/// Total stake backing a pair of forging keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgingStakeInfo {
    pub forging_keys: ForgingKeys,
    #[serde(with = "forger_core::amount")]
    pub stake_amount: Amount,
}

impl Provisioners {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aggregates the stakes by forging keys.
    pub fn from_stakes<'a>(
        stakes: impl IntoIterator<Item = &'a StakeRecord>,
    ) -> Self {
        let mut provisioners = Self::empty();
        for stake in stakes {
            provisioners.add_stake(stake.forging_keys, stake.value);
        }
        provisioners
    }

    /// Adds stake to a member, appending it if the member already exists.
    pub fn add_stake(&mut self, keys: ForgingKeys, value: Amount) {
        let total = self.members.entry(keys).or_default();
        *total = total.saturating_add(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ForgingKeys, &Amount)> {
        self.members.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ForgingKeys> {
        self.members.keys()
    }

    pub fn stake_of(&self, keys: &ForgingKeys) -> Option<Amount> {
        self.members.get(keys).copied()
    }

    pub fn contains(&self, keys: &ForgingKeys) -> bool {
        self.members.contains_key(keys)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_stake(&self) -> Amount {
        self.members
            .values()
            .fold(0, |acc, value| acc.saturating_add(*value))
    }

    /// The members ordered by descending stake. Ties are broken by the
    /// ordering of the keys, so that every node agrees on the result.
    pub fn forging_stake_info(&self) -> Vec<ForgingStakeInfo> {
        let mut info: Vec<_> = self
            .members
            .iter()
            .map(|(keys, amount)| ForgingStakeInfo {
                forging_keys: *keys,
                stake_amount: *amount,
            })
            .collect();
        info.sort_by(|a, b| {
            b.stake_amount
                .cmp(&a.stake_amount)
                .then_with(|| a.forging_keys.cmp(&b.forging_keys))
        });
        info
    }
}

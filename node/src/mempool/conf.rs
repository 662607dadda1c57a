// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Params {
    /// Maximum number of transactions that can be accepted/stored in mempool
    pub max_mempool_txn_count: usize,

    /// Maximum number of transactions included in a single block
    pub max_block_txn_count: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_mempool_txn_count: 10_000,
            max_block_txn_count: 1_000,
        }
    }
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "max_mempool_txn_count: {}, max_block_txn_count: {}",
            self.max_mempool_txn_count, self.max_block_txn_count
        )
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Replay of a list of management commands against a node.

use std::path::Path;

use forger_consensus::user::provisioners::ForgingStakeInfo;
use forger_core::abi::AbiStake;
use forger_core::keys::ForgingKeys;
use forger_core::stake::StakeId;
use forger_core::{Address, Epoch, zennies_to_wei};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{CommandError, MakeForgerStake, NodeApi};
use crate::transaction::{Receipt, TxHash};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stake, either by id or by its position in the list of live stakes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StakeRef {
    Id(StakeId),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStep {
    pub from: Address,
    pub to: Address,
    pub zennies: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendStep {
    pub stake: StakeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStep {
    pub forger: ForgingKeys,
    #[serde(default)]
    pub force_switch_to_next_epoch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoStep {
    #[serde(default)]
    pub epoch: Option<Epoch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Transfer(TransferStep),
    MakeForgerStake(MakeForgerStake),
    SpendForgingStake(SpendStep),
    GenerateBlock(BlockStep),
    AllForgingStakes,
    ForgingStakeInfo(InfoStep),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

/// What a step produced.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    Submitted {
        #[serde_as(as = "serde_with::hex::Hex")]
        tx_hash: TxHash,
    },
    #[serde(rename_all = "camelCase")]
    Block {
        height: u64,
        epoch: Epoch,
        receipts: Vec<Receipt>,
    },
    Stakes { stakes: Vec<AbiStake> },
    #[serde(rename_all = "camelCase")]
    ForgingStakeInfo {
        epoch: Epoch,
        forgers: Vec<ForgingStakeInfo>,
    },
    Failed { error: String },
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Runs every step in order. A failing step is reported in its outcome
    /// and does not stop the replay.
    pub fn run(&self, api: &NodeApi) -> Vec<Outcome> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let outcome = run_step(api, step).unwrap_or_else(|err| {
                    warn!(event = "step failed", index, %err);
                    Outcome::Failed {
                        error: err.to_string(),
                    }
                });
                info!(event = "step done", index);
                outcome
            })
            .collect()
    }
}

fn run_step(api: &NodeApi, step: &Step) -> Result<Outcome, CommandError> {
    let submitted = |tx_hash| Outcome::Submitted { tx_hash };
    match step {
        Step::Transfer(t) => api
            .transfer(t.from, t.to, zennies_to_wei(t.zennies))
            .map(submitted),
        Step::MakeForgerStake(request) => {
            api.make_forger_stake(request).map(submitted)
        }
        Step::SpendForgingStake(spend) => {
            let stake_id = match &spend.stake {
                StakeRef::Id(id) => *id,
                StakeRef::Index(index) => api
                    .all_forging_stakes()?
                    .get(*index)
                    .map(|stake| stake.stake_id)
                    .ok_or(CommandError::NoStakeAt(*index))?,
            };
            api.spend_forging_stake(stake_id).map(submitted)
        }
        Step::GenerateBlock(block) => {
            let height = api.generate_block(
                &block.forger,
                block.force_switch_to_next_epoch,
            )?;
            let epoch = api.chain().read().epoch();
            Ok(Outcome::Block {
                height,
                epoch,
                receipts: api.block_receipts(height),
            })
        }
        Step::AllForgingStakes => Ok(Outcome::Stakes {
            stakes: api.all_forging_stakes()?,
        }),
        Step::ForgingStakeInfo(info) => {
            let epoch =
                info.epoch.unwrap_or_else(|| api.chain().read().epoch());
            Ok(Outcome::ForgingStakeInfo {
                epoch,
                forgers: api.forging_stake_info(Some(epoch))?,
            })
        }
    }
}

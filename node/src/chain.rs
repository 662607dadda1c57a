// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

pub mod genesis;

use std::collections::{BTreeSet, HashMap};

use dusk_bytes::Serializable;
use forger_consensus::EligibilityGate;
use forger_consensus::errors::GateError;
use forger_consensus::user::provisioners::ForgingStakeInfo;
use forger_core::keys::ForgingKeys;
use forger_core::stake::StakeRecord;
use forger_core::{Address, Epoch, keccak256};
use forger_stake_contract::{
    CallReceipt, ForgerStakeContract, GasSchedule, Message,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::executor::{self, ExecutionConfig, ExecutionError, RejectError};
use crate::mempool::{Mempool, conf::Params as MempoolParams};
use crate::state::WorldState;
use crate::transaction::{Receipt, Transaction, TxHash};

use self::genesis::{GenesisError, Snapshot};

pub type BlockHash = [u8; 32];

#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    Genesis(#[from] GenesisError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("forging keys are not eligible in epoch {epoch}")]
    NotEligible { epoch: Epoch },
    #[error("block application failed: {0}")]
    Execution(#[from] ExecutionError),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// Number of blocks after which the next block switches epoch.
    pub blocks_per_epoch: u64,
    pub execution: ExecutionConfig,
    pub gas: GasSchedule,
    pub mempool: MempoolParams,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            blocks_per_epoch: 100,
            execution: ExecutionConfig::default(),
            gas: GasSchedule::default(),
            mempool: MempoolParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: u64,
    pub epoch: Epoch,
    pub prev_hash: BlockHash,
    /// Keys of the forger, `None` for the genesis block.
    pub forger: Option<ForgingKeys>,
    pub txs: Vec<TxHash>,
}

impl Block {
    pub fn hash(&self) -> BlockHash {
        let mut bytes =
            Vec::with_capacity(8 + 8 + 32 + 65 + 32 * self.txs.len());
        bytes.extend_from_slice(&self.height.to_be_bytes());
        bytes.extend_from_slice(&self.epoch.to_be_bytes());
        bytes.extend_from_slice(&self.prev_hash);
        if let Some(forger) = &self.forger {
            bytes.extend_from_slice(&forger.block_sign_public_key.to_bytes());
            bytes.extend_from_slice(&forger.vrf_public_key.to_bytes());
        }
        for tx in &self.txs {
            bytes.extend_from_slice(tx);
        }
        keccak256(&bytes)
    }
}

/// A single-node chain: the account state, the forger stake registry and the
/// eligibility gate, advanced one block at a time.
#[derive(Debug)]
pub struct Chain {
    config: ChainConfig,
    state: WorldState,
    registry: ForgerStakeContract,
    gate: EligibilityGate,
    mempool: Mempool,
    blocks: Vec<Block>,
    receipts: HashMap<TxHash, Receipt>,
    blocks_in_epoch: u64,
}

impl Chain {
    /// Bootstraps a chain from a genesis snapshot.
    pub fn new(
        config: ChainConfig,
        genesis: &Snapshot,
    ) -> Result<Self, ChainError> {
        let mut state = WorldState::new();
        let mut registry = ForgerStakeContract::new(config.gas);
        genesis.apply(&mut state, &mut registry)?;

        let gate = EligibilityGate::new(registry.list_stakes());
        let genesis_block = Block {
            height: 0,
            epoch: 0,
            prev_hash: [0; 32],
            forger: None,
            txs: vec![],
        };
        info!(
            event = "chain started",
            hash = hex::encode(genesis_block.hash()),
            blocks_per_epoch = config.blocks_per_epoch,
        );

        Ok(Self {
            config,
            state,
            registry,
            gate,
            mempool: Mempool::new(config.mempool),
            blocks: vec![genesis_block],
            receipts: HashMap::new(),
            blocks_in_epoch: 1,
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn registry(&self) -> &ForgerStakeContract {
        &self.registry
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    pub fn epoch(&self) -> Epoch {
        self.state.epoch()
    }

    pub fn height(&self) -> u64 {
        self.tip().height
    }

    pub fn tip(&self) -> &Block {
        // the genesis block is never removed
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn block(&self, height: u64) -> Option<&Block> {
        self.blocks.get(usize::try_from(height).ok()?)
    }

    pub fn receipt(&self, hash: &TxHash) -> Option<&Receipt> {
        self.receipts.get(hash)
    }

    pub fn pending_txs(&self) -> usize {
        self.mempool.len()
    }

    /// The nonce the next transaction of `sender` must carry, accounting for
    /// its transactions still in the mempool.
    pub fn next_nonce(&self, sender: &Address) -> u64 {
        self.mempool.next_nonce(&self.state, sender)
    }

    /// Queues a transaction for inclusion in the next block.
    pub fn submit(&mut self, tx: Transaction) -> Result<TxHash, RejectError> {
        self.mempool
            .accept_tx(&self.state, tx, &self.config.execution)
    }

    /// The live stakes, in insertion order.
    pub fn list_stakes(&self) -> Vec<StakeRecord> {
        self.registry.list_stakes()
    }

    pub fn eligible_forgers(
        &self,
        epoch: Epoch,
    ) -> Result<BTreeSet<ForgingKeys>, GateError> {
        self.gate.eligible_forgers(epoch)
    }

    pub fn forging_stake_info(
        &self,
        epoch: Epoch,
    ) -> Result<Vec<ForgingStakeInfo>, GateError> {
        self.gate.forging_stake_info(epoch)
    }

    /// Executes a call against the current state without committing it.
    pub fn call(
        &self,
        caller: Address,
        data: Vec<u8>,
        gas_limit: u64,
    ) -> Result<CallReceipt, ChainError> {
        let mut state = self.state.clone();
        let mut registry = self.registry.clone();
        let msg = Message {
            caller,
            value: 0,
            data,
            gas_limit,
            origin: [0; 32],
        };
        registry
            .execute(&mut state, &msg)
            .map_err(|e| ChainError::Execution(e.into()))
    }

    /// Produces a block forged by `forger` with the transactions waiting in
    /// the mempool.
    ///
    /// The block switches to the next epoch when the current one is full, or
    /// when `force_switch_to_next_epoch` is set. Before switching, the stake
    /// list is frozen as the snapshot of the epoch being closed.
    ///
    /// If a transaction fails fatally the block is discarded, along with the
    /// transactions it was built from.
    pub fn generate_block(
        &mut self,
        forger: &ForgingKeys,
        force_switch_to_next_epoch: bool,
    ) -> Result<&Block, ChainError> {
        let switch = force_switch_to_next_epoch
            || self.blocks_in_epoch >= self.config.blocks_per_epoch;
        let epoch = self.epoch();
        let target = if switch { epoch + 1 } else { epoch };

        if !self.gate.is_eligible(forger, target)? {
            warn!(event = "forger not eligible", epoch = target);
            return Err(ChainError::NotEligible { epoch: target });
        }

        let backup = (
            self.state.clone(),
            self.registry.clone(),
            self.gate.clone(),
            self.blocks_in_epoch,
        );
        let txs = self.mempool.take_block_txs();

        match self.apply_block(forger, switch, txs) {
            Ok(block) => {
                info!(
                    event = "block accepted",
                    height = block.height,
                    epoch = block.epoch,
                    txs = block.txs.len(),
                    hash = hex::encode(block.hash()),
                );
                self.blocks.push(block);
                Ok(self.tip())
            }
            Err(err) => {
                error!(
                    event = "block discarded",
                    height = self.height() + 1,
                    %err,
                );
                (self.state, self.registry, self.gate, self.blocks_in_epoch) =
                    backup;
                Err(err)
            }
        }
    }

    fn apply_block(
        &mut self,
        forger: &ForgingKeys,
        switch: bool,
        txs: Vec<Transaction>,
    ) -> Result<Block, ChainError> {
        if switch {
            let closed = self.epoch();
            self.gate.close_epoch(closed, self.registry.list_stakes())?;
            self.state.set_epoch(closed + 1);
            self.gate.prune(closed + 1);
            self.blocks_in_epoch = 0;
        }

        let height = self.height() + 1;
        let mut receipts = Vec::with_capacity(txs.len());
        for tx in txs {
            match executor::execute(
                &mut self.state,
                &mut self.registry,
                &tx,
                &self.config.execution,
            ) {
                Ok(mut receipt) => {
                    receipt.block_height = height;
                    receipts.push(receipt);
                }
                Err(ExecutionError::Rejected(reason)) => {
                    warn!(
                        event = "tx dropped",
                        hash = hex::encode(tx.hash()),
                        %reason,
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.blocks_in_epoch += 1;
        let block = Block {
            height,
            epoch: self.epoch(),
            prev_hash: self.tip().hash(),
            forger: Some(*forger),
            txs: receipts.iter().map(|r| r.tx_hash).collect(),
        };
        self.receipts
            .extend(receipts.into_iter().map(|r| (r.tx_hash, r)));
        Ok(block)
    }
}

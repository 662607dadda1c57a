// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Management commands, as a node operator issues them.
//!
//! Commands are checked before anything is submitted to the chain. A command
//! failing these checks produces no transaction, so it costs no fee.

use std::sync::Arc;

use forger_consensus::user::provisioners::ForgingStakeInfo;
use forger_core::abi::{self, AbiStake, ForgerStakeCall};
use forger_core::keys::{BlockSignPublicKey, ForgingKeys, VrfPublicKey};
use forger_core::stake::StakeId;
use forger_core::{
    Address, Amount, Epoch, FORGER_STAKE_CONTRACT, zennies_to_wei,
};
use forger_stake_contract::Revert;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::chain::{Chain, ChainError};
use crate::config::WalletConfig;
use crate::executor::RejectError;
use crate::transaction::{Receipt, Transaction, TxHash};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid forging keys: {0}")]
    InvalidKeys(forger_core::Error),
    #[error("stake amount must be greater than zero, got {0}")]
    NonPositiveAmount(i64),
    #[error("{0} is not an account of the local wallet")]
    UnknownAccount(Address),
    #[error("Forger Stake not found")]
    StakeNotFound(StakeId),
    #[error("no stake at index {0}")]
    NoStakeAt(usize),
    #[error("Forger Stake Owner not found")]
    OwnerNotFound(StakeId),
    #[error("transaction rejected: {0}")]
    Rejected(#[from] RejectError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("registry call reverted: {0}")]
    Reverted(Revert),
    #[error("invalid registry output: {0}")]
    Decode(forger_core::Error),
}

/// Request to delegate funds of a local account to a pair of forging keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeForgerStake {
    /// Local account paying for the stake.
    pub from: Address,
    /// Account entitled to withdraw the stake.
    pub owner_address: Address,
    pub block_sign_public_key: String,
    pub vrf_public_key: String,
    pub value_in_zennies: i64,
}

impl MakeForgerStake {
    fn forging_keys(&self) -> Result<ForgingKeys, CommandError> {
        let block_sign: BlockSignPublicKey = self
            .block_sign_public_key
            .parse()
            .map_err(CommandError::InvalidKeys)?;
        let vrf: VrfPublicKey = self
            .vrf_public_key
            .parse()
            .map_err(CommandError::InvalidKeys)?;
        Ok(ForgingKeys::new(block_sign, vrf))
    }
}

/// Entry point of the management commands.
#[derive(Debug, Clone)]
pub struct NodeApi {
    chain: Arc<RwLock<Chain>>,
    wallet: WalletConfig,
}

impl NodeApi {
    pub fn new(chain: Chain, wallet: WalletConfig) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
            wallet,
        }
    }

    /// Creates a handle on a chain shared with other handles, with a wallet
    /// of its own.
    pub fn with_chain(chain: Arc<RwLock<Chain>>, wallet: WalletConfig) -> Self {
        Self { chain, wallet }
    }

    pub fn chain(&self) -> &Arc<RwLock<Chain>> {
        &self.chain
    }

    pub fn wallet(&self) -> &WalletConfig {
        &self.wallet
    }

    /// Sends `value` wei from a local account to `to`.
    pub fn transfer(
        &self,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<TxHash, CommandError> {
        self.send(from, to, value, vec![])
    }

    /// Delegates funds to a pair of forging keys.
    pub fn make_forger_stake(
        &self,
        request: &MakeForgerStake,
    ) -> Result<TxHash, CommandError> {
        if request.value_in_zennies <= 0 {
            return Err(CommandError::NonPositiveAmount(
                request.value_in_zennies,
            ));
        }
        let forging_keys = request.forging_keys()?;
        let value = zennies_to_wei(request.value_in_zennies.unsigned_abs());

        let call = ForgerStakeCall::Delegate {
            forging_keys,
            owner: request.owner_address,
        };
        let hash = self.send(
            request.from,
            FORGER_STAKE_CONTRACT,
            value,
            call.to_call_data(),
        )?;
        info!(
            event = "stake requested",
            tx = hex::encode(hash),
            owner = %request.owner_address,
            %value,
        );
        Ok(hash)
    }

    /// Withdraws a stake owned by a local account.
    pub fn spend_forging_stake(
        &self,
        stake_id: StakeId,
    ) -> Result<TxHash, CommandError> {
        let owner = self
            .chain
            .read()
            .registry()
            .ledger()
            .peek(&stake_id)
            .map(|record| record.owner)
            .ok_or(CommandError::StakeNotFound(stake_id))?;
        if !self.wallet.owns(&owner) {
            return Err(CommandError::OwnerNotFound(stake_id));
        }

        let call = ForgerStakeCall::Withdraw { stake_id };
        let hash =
            self.send(owner, FORGER_STAKE_CONTRACT, 0, call.to_call_data())?;
        info!(
            event = "withdrawal requested",
            tx = hex::encode(hash),
            %stake_id,
        );
        Ok(hash)
    }

    /// The live stakes, read through the registry's call interface.
    pub fn all_forging_stakes(&self) -> Result<Vec<AbiStake>, CommandError> {
        let data = ForgerStakeCall::GetAllForgersStakes.to_call_data();
        let receipt = self.chain.read().call(
            Address::default(),
            data,
            self.wallet.gas_limit,
        )?;
        let output = receipt.data.map_err(CommandError::Reverted)?;
        abi::decode_stakes(&output).map_err(CommandError::Decode)
    }

    /// The eligible forgers of `epoch`, or of the current epoch.
    pub fn forging_stake_info(
        &self,
        epoch: Option<Epoch>,
    ) -> Result<Vec<ForgingStakeInfo>, CommandError> {
        let chain = self.chain.read();
        let epoch = epoch.unwrap_or_else(|| chain.epoch());
        chain
            .forging_stake_info(epoch)
            .map_err(|e| CommandError::Chain(e.into()))
    }

    /// Forges a block with the pending transactions, returning its height.
    pub fn generate_block(
        &self,
        forger: &ForgingKeys,
        force_switch_to_next_epoch: bool,
    ) -> Result<u64, CommandError> {
        let mut chain = self.chain.write();
        let block = chain.generate_block(forger, force_switch_to_next_epoch)?;
        Ok(block.height)
    }

    pub fn receipt(&self, hash: &TxHash) -> Option<Receipt> {
        self.chain.read().receipt(hash).cloned()
    }

    /// The receipts of the transactions included at `height`.
    pub fn block_receipts(&self, height: u64) -> Vec<Receipt> {
        let chain = self.chain.read();
        chain.block(height).map_or_else(Vec::new, |block| {
            block
                .txs
                .iter()
                .filter_map(|hash| chain.receipt(hash).cloned())
                .collect()
        })
    }

    fn send(
        &self,
        from: Address,
        to: Address,
        value: Amount,
        data: Vec<u8>,
    ) -> Result<TxHash, CommandError> {
        if !self.wallet.owns(&from) {
            return Err(CommandError::UnknownAccount(from));
        }
        let mut chain = self.chain.write();
        let tx = Transaction {
            from,
            to,
            nonce: chain.next_nonce(&from),
            value,
            gas_limit: self.wallet.gas_limit,
            gas_price: self.wallet.gas_price,
            data,
        };
        Ok(chain.submit(tx)?)
    }
}

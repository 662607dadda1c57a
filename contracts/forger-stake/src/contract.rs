// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::abi::{self, ForgerStakeCall};
use forger_core::events::{StakeDelegated, StakeWithdrawn};
use forger_core::keys::ForgingKeys;
use forger_core::stake::{StakeId, StakeRecord};
use forger_core::{Address, Amount, FORGER_STAKE_CONTRACT, NATIVE_CONTRACTS};
use tracing::{debug, error, info};

use crate::error::{Abort, Error, Revert};
use crate::escrow;
use crate::gas::{GasMeter, GasSchedule};
use crate::host::Host;
use crate::ledger::StakeLedger;

/// A call to the registry, as dispatched by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Account performing the call.
    pub caller: Address,
    /// Funds attached to the call.
    pub value: Amount,
    /// ABI encoded call data.
    pub data: Vec<u8>,
    /// Maximum gas the call may spend.
    pub gas_limit: u64,
    /// Hash of the transaction carrying the call.
    pub origin: [u8; 32],
}

impl Message {
    pub fn new(
        caller: Address,
        call: &ForgerStakeCall,
        gas_limit: u64,
        origin: [u8; 32],
    ) -> Self {
        Self {
            caller,
            value: 0,
            data: call.to_call_data(),
            gas_limit,
            origin,
        }
    }

    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// The receipt of a call that did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReceipt {
    /// Gas spent by the call. A reverted call spends its whole limit.
    pub gas_spent: u64,
    /// Gas limit of the call.
    pub gas_limit: u64,
    /// Data returned by the call, or the reason it reverted.
    pub data: Result<Vec<u8>, Revert>,
}

impl CallReceipt {
    pub fn is_success(&self) -> bool {
        self.data.is_ok()
    }
}

/// Native contract keeping track of the stakes delegated to forgers.
///
/// Any account can delegate funds to a pair of forging keys, naming the owner
/// of the new stake. Only the owner can withdraw it, and the funds go back to
/// the owner. The funds of all the live stakes are held in the balance of
/// [`FORGER_STAKE_CONTRACT`].
#[derive(Debug, Clone, Default)]
pub struct ForgerStakeContract {
    ledger: StakeLedger,
    schedule: GasSchedule,
}

impl ForgerStakeContract {
    pub fn new(schedule: GasSchedule) -> Self {
        Self {
            ledger: StakeLedger::new(),
            schedule,
        }
    }

    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    pub fn schedule(&self) -> &GasSchedule {
        &self.schedule
    }

    /// The live stakes, in insertion order.
    pub fn list_stakes(&self) -> Vec<StakeRecord> {
        self.ledger.iter().cloned().collect()
    }

    /// Adds a stake minted at chain bootstrap. The registry's balance is
    /// credited with `value` out of thin air.
    pub fn add_genesis_stake<H: Host>(
        &mut self,
        host: &mut H,
        origin: &[u8; 32],
        owner: Address,
        forging_keys: ForgingKeys,
        value: Amount,
    ) -> Result<StakeId, Abort> {
        if value == 0 {
            return Err(Revert::ZeroValue.into());
        }
        escrow::verify(host, self.ledger.total())?;

        let checkpoint = self.ledger.checkpoint();
        let stake_id = self.ledger.insert(
            origin,
            owner,
            forging_keys,
            value,
            host.current_epoch(),
            &mut GasMeter::unmetered(),
        )?;
        if let Err(err) = host.credit(&FORGER_STAKE_CONTRACT, value) {
            self.ledger.rollback(checkpoint);
            return Err(Error::from(err).into());
        }
        self.ledger.commit(checkpoint);

        info!(event = "genesis stake", %stake_id, %owner, %value);
        Ok(stake_id)
    }

    /// Executes a call within a transactional scope.
    ///
    /// A reverted call leaves neither the ledger nor the host changed, and
    /// is reported in the receipt. A fatal error is returned as such, after
    /// rolling back the changes of the call.
    pub fn execute<H: Host>(
        &mut self,
        host: &mut H,
        msg: &Message,
    ) -> Result<CallReceipt, Error> {
        let mut gas = GasMeter::new(self.schedule, msg.gas_limit);
        let snapshot = host.snapshot();
        let checkpoint = self.ledger.checkpoint();

        match self.dispatch(host, msg, &mut gas) {
            Ok(data) => {
                self.ledger.commit(checkpoint);
                Ok(CallReceipt {
                    gas_spent: gas.spent(),
                    gas_limit: msg.gas_limit,
                    data: Ok(data),
                })
            }
            Err(Abort::Revert(revert)) => {
                self.ledger.rollback(checkpoint);
                host.revert_to_snapshot(snapshot);
                debug!(event = "call reverted", caller = %msg.caller, %revert);
                Ok(CallReceipt {
                    gas_spent: msg.gas_limit,
                    gas_limit: msg.gas_limit,
                    data: Err(revert),
                })
            }
            Err(Abort::Fatal(err)) => {
                self.ledger.rollback(checkpoint);
                host.revert_to_snapshot(snapshot);
                error!(event = "registry failure", caller = %msg.caller, %err);
                Err(err)
            }
        }
    }

    fn dispatch<H: Host>(
        &mut self,
        host: &mut H,
        msg: &Message,
        gas: &mut GasMeter,
    ) -> Result<Vec<u8>, Abort> {
        gas.charge(self.schedule.call)?;
        let call = ForgerStakeCall::from_call_data(&msg.data)
            .map_err(Revert::InvalidCall)?;

        match call {
            ForgerStakeCall::GetAllForgersStakes => {
                non_payable(msg)?;
                let stakes = self.ledger.list(gas)?;
                Ok(abi::encode_stakes(stakes.iter()))
            }
            ForgerStakeCall::Delegate {
                forging_keys,
                owner,
            } => {
                let stake_id =
                    self.delegate(host, msg, owner, forging_keys, gas)?;
                Ok(stake_id.as_bytes().to_vec())
            }
            ForgerStakeCall::Withdraw { stake_id } => {
                non_payable(msg)?;
                self.withdraw(host, &msg.caller, &stake_id, gas)?;
                Ok(Vec::new())
            }
        }
    }

    fn delegate<H: Host>(
        &mut self,
        host: &mut H,
        msg: &Message,
        owner: Address,
        forging_keys: ForgingKeys,
        gas: &mut GasMeter,
    ) -> Result<StakeId, Abort> {
        if NATIVE_CONTRACTS.contains(&owner)
            || !host.is_externally_owned(&owner)
        {
            return Err(Revert::DisallowedOwner(owner).into());
        }
        if msg.value == 0 {
            return Err(Revert::ZeroValue.into());
        }

        escrow::reserve(
            host,
            self.ledger.total(),
            &msg.caller,
            msg.value,
            gas,
        )?;
        let stake_id = self.ledger.insert(
            &msg.origin,
            owner,
            forging_keys,
            msg.value,
            host.current_epoch(),
            gas,
        )?;
        escrow::verify(host, self.ledger.total())?;

        let log = StakeDelegated {
            from: msg.caller,
            owner,
            stake_id,
            value: msg.value,
        }
        .to_log(FORGER_STAKE_CONTRACT);
        gas.charge_log(log.topics.len(), log.data.len())?;
        host.emit_log(log);

        info!(
            event = "stake delegated",
            %stake_id,
            from = %msg.caller,
            %owner,
            value = %msg.value,
        );
        Ok(stake_id)
    }

    fn withdraw<H: Host>(
        &mut self,
        host: &mut H,
        caller: &Address,
        stake_id: &StakeId,
        gas: &mut GasMeter,
    ) -> Result<(), Abort> {
        let record = self
            .ledger
            .get(stake_id, gas)?
            .ok_or(Revert::NotFound(*stake_id))?;
        if record.owner != *caller {
            return Err(Revert::NotOwner {
                stake_id: *stake_id,
                caller: *caller,
            }
            .into());
        }

        let tracked = self.ledger.total();
        self.ledger
            .remove(stake_id, gas)?
            .ok_or(Revert::NotFound(*stake_id))?;
        escrow::release(host, tracked, &record.owner, record.value, gas)?;
        escrow::verify(host, self.ledger.total())?;

        let log = StakeWithdrawn {
            owner: record.owner,
            stake_id: *stake_id,
        }
        .to_log(FORGER_STAKE_CONTRACT);
        gas.charge_log(log.topics.len(), log.data.len())?;
        host.emit_log(log);

        info!(
            event = "stake withdrawn",
            %stake_id,
            owner = %record.owner,
            value = %record.value,
        );
        Ok(())
    }
}

fn non_payable(msg: &Message) -> Result<(), Revert> {
    if msg.value == 0 {
        Ok(())
    } else {
        Err(Revert::NonPayable)
    }
}

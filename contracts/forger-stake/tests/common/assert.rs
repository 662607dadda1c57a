// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::events::{Log, StakeDelegated, StakeWithdrawn};
use forger_core::stake::StakeId;
use forger_core::{Address, Amount};
use forger_stake_contract::ForgerStakeContract;

use super::host::TestHost;

pub fn assert_escrow(contract: &ForgerStakeContract, host: &TestHost) {
    let sum: Amount = contract.list_stakes().iter().map(|s| s.value).sum();
    assert_eq!(
        host.registry_balance(),
        sum,
        "Registry balance should equal the sum of the live stakes"
    );
    assert_eq!(contract.ledger().total(), sum, "Tracked total incorrect");
}

pub fn assert_delegate_event(
    logs: &[Log],
    from: &Address,
    owner: &Address,
    stake_id: &StakeId,
    value: Amount,
) {
    assert_eq!(logs.len(), 1, "Exactly one log should be emitted");
    let event = StakeDelegated::from_log(&logs[0])
        .expect("Log should carry a delegation event");
    assert_eq!(event.from, *from, "Delegate-event: from incorrect");
    assert_eq!(event.owner, *owner, "Delegate-event: owner incorrect");
    assert_eq!(event.stake_id, *stake_id, "Delegate-event: id incorrect");
    assert_eq!(event.value, value, "Delegate-event: value incorrect");
}

pub fn assert_withdraw_event(
    logs: &[Log],
    owner: &Address,
    stake_id: &StakeId,
) {
    assert_eq!(logs.len(), 1, "Exactly one log should be emitted");
    let event = StakeWithdrawn::from_log(&logs[0])
        .expect("Log should carry a withdrawal event");
    assert_eq!(event.owner, *owner, "Withdraw-event: owner incorrect");
    assert_eq!(event.stake_id, *stake_id, "Withdraw-event: id incorrect");
}

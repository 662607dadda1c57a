// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::{BTreeMap, BTreeSet};

use dusk_bytes::Serializable;
use forger_consensus::EligibilityGate;
use forger_consensus::errors::GateError;
use forger_consensus::user::stake::StakeStatus;
use forger_core::keys::{BlockSignPublicKey, ForgingKeys, VrfPublicKey};
use forger_core::stake::{ACTIVATION_DELAY, StakeId, StakeRecord};
use forger_core::{Address, Epoch};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

const EPOCHS: Epoch = 40;

fn random_keys(rng: &mut StdRng) -> ForgingKeys {
    let mut vrf = [0u8; 33];
    rng.fill_bytes(&mut vrf);
    vrf[0] = 0x02;
    ForgingKeys::new(
        BlockSignPublicKey::from_array(rng.r#gen()),
        VrfPublicKey::from_bytes(&vrf).expect("tagged key is valid"),
    )
}

/// Lifetime of a stake: the epoch it was created in, and the one it was
/// withdrawn in.
struct History {
    record: StakeRecord,
    withdrawn: Option<Epoch>,
}

#[test]
fn eligibility_follows_the_activation_delay() {
    let rng = &mut StdRng::seed_from_u64(0xe90c);
    let mut sequence = 0u64;
    let mut new_stake = |rng: &mut StdRng, epoch: Epoch| {
        sequence += 1;
        StakeRecord::new(
            StakeId::derive(&[0; 32], sequence),
            Address::from_array(rng.r#gen()),
            random_keys(rng),
            u128::from(rng.gen_range(1..1_000u64)),
            epoch,
        )
    };

    let genesis = new_stake(rng, 0);
    let genesis_id = genesis.stake_id;
    let mut gate = EligibilityGate::new(vec![genesis.clone()]);
    let mut live = vec![genesis.clone()];
    let mut history = vec![History {
        record: genesis,
        withdrawn: None,
    }];

    for epoch in 0..EPOCHS {
        for _ in 0..rng.gen_range(0..4) {
            if live.is_empty() || rng.gen_bool(0.6) {
                let record = new_stake(rng, epoch);
                live.push(record.clone());
                history.push(History {
                    record,
                    withdrawn: None,
                });
            } else {
                let removed = live.remove(rng.gen_range(0..live.len()));
                let entry = history
                    .iter_mut()
                    .find(|h| h.record.stake_id == removed.stake_id)
                    .expect("stake has a history");
                entry.withdrawn = Some(epoch);
            }
        }
        gate.close_epoch(epoch, live.clone()).expect("closing in order");
    }

    for epoch in 0..EPOCHS + 2 {
        let mut expected = BTreeMap::<ForgingKeys, u128>::new();
        for h in &history {
            // the first epochs only know about the genesis stake
            let active = if epoch < ACTIVATION_DELAY {
                h.record.stake_id == genesis_id
            } else {
                let status = StakeStatus::of(&h.record, h.withdrawn, epoch);
                assert_eq!(gate.status(&h.record, epoch), Ok(status));
                status == StakeStatus::Active
            };
            if active {
                *expected.entry(h.record.forging_keys).or_default() +=
                    h.record.value;
            }
        }
        let forgers = gate.eligible_forgers(epoch).expect("epoch is final");
        let expected_keys: BTreeSet<_> = expected.keys().copied().collect();
        assert_eq!(forgers, expected_keys, "Eligible forgers of epoch {epoch}");

        let provisioners = gate.provisioners(epoch).expect("epoch is final");
        for (keys, amount) in &expected {
            assert_eq!(provisioners.stake_of(keys), Some(*amount));
        }
    }
    assert_eq!(
        gate.eligible_forgers(EPOCHS + 2),
        Err(GateError::EpochNotFinal(EPOCHS))
    );
}

#[test]
fn delegated_stake_becomes_eligible_two_epochs_later() {
    let rng = &mut StdRng::seed_from_u64(0xde1a);
    let genesis_keys = random_keys(rng);
    let keys = random_keys(rng);
    let owner = Address::from_array(rng.r#gen());
    let genesis_id = StakeId::derive(&[1; 32], 0);
    let genesis = StakeRecord::new(genesis_id, owner, genesis_keys, 10, 0);
    let delegated_id = StakeId::derive(&[2; 32], 1);
    let delegated = StakeRecord::new(delegated_id, owner, keys, 10, 3);

    let mut gate = EligibilityGate::new(vec![genesis.clone()]);
    for epoch in 0..3 {
        gate.close_epoch(epoch, vec![genesis.clone()]).expect("close");
    }
    // delegated during epoch 3, withdrawn during epoch 6
    for epoch in 3..6 {
        gate.close_epoch(epoch, vec![genesis.clone(), delegated.clone()])
            .expect("close");
    }
    gate.close_epoch(6, vec![genesis.clone()]).expect("close");

    let eligible = |epoch| {
        gate.eligible_forgers(epoch)
            .expect("epoch is final")
            .contains(&keys)
    };
    assert!(!eligible(3));
    assert!(!eligible(4));
    assert!(eligible(5));
    assert!(eligible(6));
    assert!(eligible(7));
    assert!(!eligible(8));
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};

use crate::Revert;

/// Gas charged by the registry for each unit of work.
///
/// Storage writes are priced on the transition of the written cell, so that
/// filling an empty cell costs more than updating it, and clearing it costs
/// the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Charged once per call, before decoding.
    pub call: u64,
    /// Reading a storage cell.
    pub read: u64,
    /// Writing a non-empty value to an empty cell.
    pub store_new: u64,
    /// Writing a non-empty value to a non-empty cell.
    pub store_update: u64,
    /// Emptying a non-empty cell.
    pub store_clear: u64,
    /// Moving funds between two accounts.
    pub transfer: u64,
    /// Emitting a log.
    pub log: u64,
    /// Each topic of an emitted log.
    pub log_topic: u64,
    /// Each byte of the payload of an emitted log.
    pub log_data_byte: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            call: 700,
            read: 2_100,
            store_new: 20_000,
            store_update: 5_000,
            store_clear: 2_900,
            transfer: 9_000,
            log: 375,
            log_topic: 375,
            log_data_byte: 8,
        }
    }
}

/// Tracks the gas spent by a single call against its limit.
#[derive(Debug, Clone)]
pub struct GasMeter {
    schedule: GasSchedule,
    limit: u64,
    spent: u64,
}

impl GasMeter {
    pub fn new(schedule: GasSchedule, limit: u64) -> Self {
        Self {
            schedule,
            limit,
            spent: 0,
        }
    }

    /// A meter that never runs out of gas, used for genesis.
    pub fn unmetered() -> Self {
        Self::new(GasSchedule::default(), u64::MAX)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn schedule(&self) -> &GasSchedule {
        &self.schedule
    }

    /// Charges `amount` gas. Exceeding the limit spends all of it.
    pub fn charge(&mut self, amount: u64) -> Result<(), Revert> {
        match self.spent.checked_add(amount) {
            Some(spent) if spent <= self.limit => {
                self.spent = spent;
                Ok(())
            }
            _ => {
                self.spent = self.limit;
                Err(Revert::OutOfGas)
            }
        }
    }

    pub fn charge_read(&mut self, cells: u64) -> Result<(), Revert> {
        self.charge(self.schedule.read.saturating_mul(cells))
    }

    /// Charges the write of `cells` storage cells, priced on whether they
    /// were empty before and after the write.
    pub fn charge_write(
        &mut self,
        cells: u64,
        was_empty: bool,
        is_empty: bool,
    ) -> Result<(), Revert> {
        let unit = match (was_empty, is_empty) {
            (true, true) => 0,
            (true, false) => self.schedule.store_new,
            (false, false) => self.schedule.store_update,
            (false, true) => self.schedule.store_clear,
        };
        self.charge(unit.saturating_mul(cells))
    }

    pub fn charge_log(
        &mut self,
        topics: usize,
        data_len: usize,
    ) -> Result<(), Revert> {
        let s = &self.schedule;
        let cost = s
            .log
            .saturating_add(s.log_topic.saturating_mul(topics as u64))
            .saturating_add(s.log_data_byte.saturating_mul(data_len as u64));
        self.charge(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_gas_spends_the_limit() {
        let mut meter = GasMeter::new(GasSchedule::default(), 10_000);
        meter.charge(4_000).expect("within limit");
        assert_eq!(meter.spent(), 4_000);
        assert_eq!(meter.charge(6_001), Err(Revert::OutOfGas));
        assert_eq!(meter.spent(), 10_000);
    }

    #[test]
    fn write_pricing() {
        let schedule = GasSchedule::default();
        let mut meter = GasMeter::unmetered();
        meter.charge_write(2, true, false).expect("unmetered");
        assert_eq!(meter.spent(), 2 * schedule.store_new);
        meter.charge_write(1, true, true).expect("unmetered");
        assert_eq!(meter.spent(), 2 * schedule.store_new);
    }

    #[test]
    fn partial_schedule_uses_defaults() {
        let schedule: GasSchedule =
            toml::from_str("read = 800").expect("valid schedule");
        assert_eq!(schedule.read, 800);
        assert_eq!(schedule.store_new, GasSchedule::default().store_new);
    }
}

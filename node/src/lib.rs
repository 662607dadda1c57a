// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! A single-node chain running the forger stake registry.

pub mod api;
pub mod chain;
pub mod config;
pub mod executor;
pub mod mempool;
pub mod scenario;
pub mod state;
pub mod transaction;

pub use api::NodeApi;
pub use chain::Chain;
pub use config::Config;

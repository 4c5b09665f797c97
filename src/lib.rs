// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod kv;
pub mod ledger;
pub mod models;
pub mod pending;
pub mod profile;
pub mod remote;
pub mod restore;
pub mod store;
pub mod sync;
pub mod utils;

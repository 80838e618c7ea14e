// Copyright (c) 2022-2023 Aptos Labs

//! Tests for Aptos app integration.
//!
//! Generic over [ledger_aptos::transport::Transport] for reuse against
//! emulated, simulated and physical devices.
//!

pub mod version;

pub mod public_key;

pub mod sign;

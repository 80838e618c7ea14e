// Copyright (c) 2022-2023 Aptos Labs

//! Approval drivers for interactive operations
//!
//! An [Approver] is invoked once per interactive operation, after the final
//! frame has been sent and before the device response is read. For physical
//! devices this is a person at the device ([DeviceApprover]), for emulators
//! the navigation is scripted (see `ledger-aptos-sim`).

use std::future::Future;

use async_trait::async_trait;
use log::info;

/// Outcome of an approval step
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum Approval {
    /// Operation approved on device
    Approved,
    /// Operation rejected on device
    Rejected,
}

/// Approval driver trait
#[async_trait]
pub trait Approver: Send + Sync {
    /// Drive the on-device review, returning the outcome
    async fn confirm(&self) -> anyhow::Result<Approval>;
}

/// Blanket [Approver] implementation for async closures
#[async_trait]
impl<F, R> Approver for F
where
    F: Fn() -> R + Send + Sync,
    R: Future<Output = anyhow::Result<Approval>> + Send,
{
    async fn confirm(&self) -> anyhow::Result<Approval> {
        (self)().await
    }
}

/// Approver for physical devices, the user reviews and approves on the
/// device itself and the device reports a refusal via status word.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DeviceApprover;

#[async_trait]
impl Approver for DeviceApprover {
    async fn confirm(&self) -> anyhow::Result<Approval> {
        info!("Review and approve the request on your device");
        Ok(Approval::Approved)
    }
}

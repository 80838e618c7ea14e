// Copyright (c) 2022-2023 Aptos Labs

//! Ledger Aptos API Library (and CLI)
//!
//! Host-side driver for the Aptos Ledger application. Requests are encoded
//! via [apdu], exchanged over a [Transport] by a [session::Session] and,
//! for interactive operations, interleaved with an [Approver].

use std::net::SocketAddr;

use ledger_lib::{info::Model, transport::TcpInfo, Filters, Transport as _};
use log::debug;

pub mod transport;
use transport::*;

/// Re-export `ledger-aptos-apdu` for consumers
pub use ledger_aptos_apdu::{self as apdu};

/// Re-export `ledger-lib` device information
pub use ledger_lib::LedgerInfo;

pub mod approver;
pub use approver::{Approval, Approver, DeviceApprover};

pub mod session;

mod handle;
pub use handle::{AppInfo, AppVersion, DeviceHandle, HandleConfig};

mod keys;
pub use keys::{PublicKey, Signature, PUBLIC_KEY_PREFIX};

mod error;
pub use error::Error;

/// Default Speculos APDU socket
pub const DEFAULT_SPECULOS_ADDR: &str = "127.0.0.1:9999";

/// Device handle for devices connected via [LedgerProvider]
pub type GenericHandle = DeviceHandle<GenericTransport>;

/// Device discovery filter
#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum, strum::Display)]
#[non_exhaustive]
pub enum Filter {
    /// List all devices available using supported transport
    Any,
    /// List only HID devices
    Hid,
    /// List only TCP devices
    Tcp,
}

impl From<Filter> for Filters {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Any => Filters::Any,
            Filter::Hid => Filters::Hid,
            Filter::Tcp => Filters::Tcp,
        }
    }
}

/// Aptos device discovery and connection, via [ledger_lib::LedgerProvider]
///
/// Only one provider should exist per process.
pub struct LedgerProvider {
    p: ledger_lib::LedgerProvider,
}

impl LedgerProvider {
    /// Start the provider
    pub async fn init() -> Self {
        let p = ledger_lib::LedgerProvider::init().await;

        // Give the provider worker time to start
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        Self { p }
    }

    /// List available devices matching `filter`
    pub async fn list_devices(&mut self, filter: Filter) -> Result<Vec<LedgerInfo>, TransportError> {
        let devices = self.p.list(filter.into()).await?;

        debug!("Found {} devices: {:?}", devices.len(), devices);

        Ok(devices)
    }

    /// Connect to a listed device
    pub async fn connect(
        &mut self,
        info: LedgerInfo,
        cfg: HandleConfig,
    ) -> Result<GenericHandle, TransportError> {
        debug!("Connecting to: {:?}", info);

        let d = self.p.connect(info).await?;

        Ok(DeviceHandle::new(LedgerTransport::new(d), cfg))
    }

    /// Connect to a Speculos APDU socket
    pub async fn connect_tcp(
        &mut self,
        addr: SocketAddr,
        cfg: HandleConfig,
    ) -> Result<GenericHandle, TransportError> {
        let info = LedgerInfo {
            model: Model::NanoSPlus,
            conn: TcpInfo { addr }.into(),
        };

        self.connect(info, cfg).await
    }
}

/// Describe a device for listings
pub fn describe(info: &LedgerInfo) -> String {
    format!("{:?} ({:?})", info.model, info.conn)
}

// Copyright (c) 2022-2023 Aptos Labs

//! Device transports
//!
//! [Transport] splits an exchange into `send` and `receive` so the
//! approval step can run while the device holds the final frame.
//! Physical (HID) and Speculos (TCP) devices are reached through
//! `ledger-lib`, see [LedgerTransport].

use async_trait::async_trait;
use log::trace;

use ledger_aptos_apdu::ApduError;

mod ledger;
pub use ledger::{LedgerTransport, DEFAULT_EXCHANGE_TIMEOUT, MAX_RESPONSE_LEN};

/// Transport for devices connected via [ledger_lib::LedgerProvider]
pub type GenericTransport = LedgerTransport<ledger_lib::LedgerHandle>;

/// Device transport, moves raw APDU frames to and from a device
///
/// Transports are strictly request / response, each [Transport::send]
/// must be followed by a [Transport::receive] before the next frame.
#[async_trait]
pub trait Transport: Send {
    /// Transport error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send an encoded APDU frame
    async fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Receive a response, returning the status word and body
    async fn receive(&mut self) -> Result<(u16, Vec<u8>), Self::Error>;

    /// Send a frame and await the response
    async fn exchange(&mut self, frame: &[u8]) -> Result<(u16, Vec<u8>), Self::Error> {
        trace!("exchange: {}", hex::encode(frame));

        self.send(frame).await?;
        let (sw, body) = self.receive().await?;

        trace!("response: 0x{:04x} {}", sw, hex::encode(&body));

        Ok((sw, body))
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not find the requested device
    #[error("Device not found")]
    NoDevice,

    /// Error from the underlying ledger transport
    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger_lib::Error),

    /// Device lost following a failed exchange
    #[error("Transport closed")]
    Closed,

    /// Receive without a preceding send
    #[error("No request in flight")]
    NoRequest,

    /// Response exceeds the maximum APDU response length
    #[error("Invalid response length")]
    InvalidLength,

    /// Response could not be split into body and status
    #[error("Invalid response: {0}")]
    Apdu(ApduError),
}

impl From<ApduError> for TransportError {
    fn from(e: ApduError) -> Self {
        TransportError::Apdu(e)
    }
}

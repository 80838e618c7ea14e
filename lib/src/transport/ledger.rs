// Copyright (c) 2022-2023 Aptos Labs

//! [Transport] adapter over `ledger-lib` devices
//!
//! `ledger-lib` only offers a combined [Exchange], so [Transport::send]
//! starts the exchange on a task and [Transport::receive] collects its
//! result. The device has the frame while the approval step runs.

use std::time::Duration;

use async_trait::async_trait;
use ledger_lib::{Exchange, LedgerHandle};
use log::{debug, trace};
use tokio::task::JoinHandle;

use ledger_aptos_apdu::frame::decode_response;

use super::{Transport, TransportError};

/// Maximum response length, a 256 byte body and the status word
pub const MAX_RESPONSE_LEN: usize = 256 + 2;

/// Default bound on a single exchange, including on-device review
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(300);

type Exchanged<D> = (D, Result<Vec<u8>, ledger_lib::Error>);

/// Device ownership, moved into a task while an exchange is in flight
enum Link<D> {
    Idle(D),
    Pending(JoinHandle<Exchanged<D>>),
    Closed,
}

/// [Transport] for `ledger-lib` devices (HID, TCP)
pub struct LedgerTransport<D = LedgerHandle> {
    link: Link<D>,
    timeout: Duration,
}

impl<D> From<D> for LedgerTransport<D>
where
    D: Exchange + Send + 'static,
{
    fn from(d: D) -> Self {
        Self::new(d)
    }
}

impl<D> LedgerTransport<D>
where
    D: Exchange + Send + 'static,
{
    /// Wrap a `ledger-lib` device
    pub fn new(d: D) -> Self {
        Self {
            link: Link::Idle(d),
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// Set the bound passed to each underlying exchange
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Await any in-flight exchange, returning the device to idle
    async fn settle(
        &mut self,
    ) -> Result<Option<Result<Vec<u8>, ledger_lib::Error>>, TransportError> {
        let h = match &mut self.link {
            Link::Pending(h) => h,
            Link::Idle(_) => return Ok(None),
            Link::Closed => return Err(TransportError::Closed),
        };

        let r = h.await;

        match r {
            Ok((d, resp)) => {
                self.link = Link::Idle(d);
                Ok(Some(resp))
            }
            Err(e) => {
                debug!("exchange task failed: {:?}", e);
                self.link = Link::Closed;
                Err(TransportError::Closed)
            }
        }
    }
}

#[async_trait]
impl<D> Transport for LedgerTransport<D>
where
    D: Exchange + Send + 'static,
{
    type Error = TransportError;

    async fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        // Responses left by a cancelled operation are dropped
        if let Some(r) = self.settle().await? {
            debug!("discarding stale response: {:?}", r.map(hex::encode));
        }

        let mut d = match std::mem::replace(&mut self.link, Link::Closed) {
            Link::Idle(d) => d,
            _ => return Err(TransportError::Closed),
        };

        trace!("send: {}", hex::encode(frame));

        let (frame, timeout) = (frame.to_vec(), self.timeout);
        self.link = Link::Pending(tokio::spawn(async move {
            let r = d.exchange(&frame, timeout).await;
            (d, r)
        }));

        Ok(())
    }

    async fn receive(&mut self) -> Result<(u16, Vec<u8>), Self::Error> {
        let resp = match self.settle().await? {
            Some(r) => r?,
            None => return Err(TransportError::NoRequest),
        };

        if resp.len() > MAX_RESPONSE_LEN {
            return Err(TransportError::InvalidLength);
        }

        let (sw, body) = decode_response(&resp)?;

        Ok((sw, body.to_vec()))
    }
}

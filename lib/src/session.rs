// Copyright (c) 2022-2023 Aptos Labs

//! Command session, drives a single logical operation over a [Transport]
//!
//! ```text
//! Idle -> Sending{0, n} -> .. -> Sending{n-1, n} -> Completed
//!                                       |
//!                                       +-> AwaitingApproval -> Completed
//! ```
//!
//! Frames are exchanged strictly in order, each response is received
//! before the next frame is sent. For interactive operations the
//! [Approver] runs once the final frame has been sent, the terminal
//! response is read only after it returns.

use std::time::Duration;

use log::debug;

use ledger_aptos_apdu::{frame::request_to_frame, status::StatusWord, ApduError, ApduReq};

use crate::{
    approver::{Approval, Approver},
    transport::Transport,
    Error,
};

/// Command session state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing in flight
    Idle,
    /// Frame `index` of `total` in flight
    Sending { index: usize, total: usize },
    /// Final frame sent, waiting on the approval driver
    AwaitingApproval,
    /// Operation complete
    Completed { success: bool },
}

/// Command session over a borrowed transport
pub struct Session<'a, T: Transport> {
    t: &'a mut T,
    state: SessionState,
    request_timeout: Duration,
    user_timeout: Option<Duration>,
}

impl<'a, T: Transport> Session<'a, T> {
    /// Create a new session
    pub fn new(t: &'a mut T, request_timeout: Duration, user_timeout: Option<Duration>) -> Self {
        Self {
            t,
            state: SessionState::Idle,
            request_timeout,
            user_timeout,
        }
    }

    /// Fetch the current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Issue a single-frame, non-interactive request, returning the response body
    pub async fn request(&mut self, req: &impl ApduReq) -> Result<Vec<u8>, Error<T::Error>> {
        let f = request_to_frame(req)?;
        self.run(&[f], None).await
    }

    /// Run an operation comprising the provided (encoded) frames, returning
    /// the terminal response body.
    ///
    /// When an `approver` is provided it is awaited after the final frame is
    /// sent and before the final response is received.
    pub async fn run(
        &mut self,
        frames: &[Vec<u8>],
        approver: Option<&dyn Approver>,
    ) -> Result<Vec<u8>, Error<T::Error>> {
        let r = self.run_frames(frames, approver).await;

        self.transition(SessionState::Completed {
            success: r.is_ok(),
        });

        r
    }

    async fn run_frames(
        &mut self,
        frames: &[Vec<u8>],
        approver: Option<&dyn Approver>,
    ) -> Result<Vec<u8>, Error<T::Error>> {
        let total = frames.len();
        if total == 0 {
            return Err(Error::Apdu(ApduError::InvalidLength));
        }

        let mut body = Vec::new();

        for (index, f) in frames.iter().enumerate() {
            let ins = f.get(1).copied().unwrap_or_default();
            let last = index + 1 == total;

            self.transition(SessionState::Sending { index, total });

            let (sw, b) = match (last, approver) {
                (true, Some(a)) => {
                    tokio::time::timeout(self.request_timeout, self.t.send(f))
                        .await?
                        .map_err(Error::Transport)?;

                    self.transition(SessionState::AwaitingApproval);

                    self.await_approval(a).await?
                }
                _ => tokio::time::timeout(self.request_timeout, self.t.exchange(f))
                    .await?
                    .map_err(Error::Transport)?,
            };

            check_status(sw, ins)?;

            // Intermediate chunks are acknowledged with an empty body
            if !last && !b.is_empty() {
                return Err(Error::MalformedResponse);
            }

            body = b;
        }

        Ok(body)
    }

    /// Await the approval driver then the terminal response, bounded by the
    /// user timeout
    async fn await_approval(
        &mut self,
        a: &dyn Approver,
    ) -> Result<(u16, Vec<u8>), Error<T::Error>> {
        let user_timeout = self.user_timeout;
        let t = &mut *self.t;

        let f = async move {
            let approval = a.confirm().await.map_err(Error::Approver)?;

            debug!("approval: {}", approval);

            let (sw, body) = t.receive().await.map_err(Error::Transport)?;

            match approval {
                Approval::Approved => Ok((sw, body)),
                Approval::Rejected => {
                    debug!("drained response 0x{:04x} following rejection", sw);
                    Err(Error::UserDenied)
                }
            }
        };

        match user_timeout {
            Some(d) => tokio::time::timeout(d, f)
                .await
                .map_err(|_| Error::UserTimeout)?,
            None => f.await,
        }
    }

    fn transition(&mut self, s: SessionState) {
        debug!("session: {:?} -> {:?}", self.state, s);
        self.state = s;
    }
}

/// Map a status word to a result, any non-success status is fatal
pub(crate) fn check_status<E: std::fmt::Display + std::fmt::Debug>(
    sw: u16,
    ins: u8,
) -> Result<(), Error<E>> {
    match StatusWord::from_raw(sw) {
        Some(StatusWord::Ok) => Ok(()),
        Some(StatusWord::Deny) => Err(Error::UserDenied),
        _ => Err(Error::Device { status: sw, ins }),
    }
}

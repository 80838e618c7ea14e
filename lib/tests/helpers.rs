// Copyright (c) 2022-2023 Aptos Labs

//! In-process emulation of the Aptos app for integration tests

#![allow(unused)]

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use encdec::{DecodeOwned, Encode};
use log::{debug, LevelFilter};
use simplelog::SimpleLogger;

use ledger_aptos::{
    apdu::{
        app_info::{AppAndVersionResp, AppNameResp, VersionResp},
        chunk::ChunkFlags,
        frame::decode_frame,
        path::DerivationPath,
        public_key::PublicKeyResp,
        sign::SignatureResp,
        status::StatusWord,
        ApduError, Instruction, APTOS_APDU_CLA, BOLOS_APDU_CLA,
    },
    transport::Transport,
    Approval, DeviceHandle, HandleConfig, PUBLIC_KEY_PREFIX,
};

pub const APP_NAME: &str = "Aptos";
pub const APP_VERSION: (u8, u8, u8) = (0, 6, 9);

/// Emulated device events, in the order they occur
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Frame received (ins, p1, p2)
    Frame(u8, u8, u8),
    /// Approval step ran
    Approval(Approval),
}

/// Response pending the next receive
#[derive(Debug)]
enum Pending {
    Ready(u16, Vec<u8>),
    PublicKey(DerivationPath),
    Sign(DerivationPath, Vec<u8>),
}

/// Transaction reassembly state
#[derive(Debug, Default)]
struct TxState {
    seq: u8,
    path: Option<DerivationPath>,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    decision: Option<Approval>,
}

/// Emulated Aptos app, implements [Transport]
///
/// Keys are derived per path from a master ed25519 key, the approval
/// decision is shared with approvers built via [Emulator::approver].
#[derive(Clone)]
pub struct Emulator {
    master: Arc<SigningKey>,
    inner: Arc<Mutex<Inner>>,
    max_tx_len: usize,
}

/// Transport half of the emulator
pub struct EmulatorTransport {
    e: Emulator,
    tx: TxState,
    pending: Option<Pending>,
}

impl Emulator {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            master: Arc::new(SigningKey::from_bytes(&seed)),
            inner: Arc::new(Mutex::new(Inner::default())),
            max_tx_len: 4096,
        }
    }

    /// Set the maximum accepted transaction length
    pub fn with_max_tx_len(mut self, n: usize) -> Self {
        self.max_tx_len = n;
        self
    }

    /// Create a transport for this emulator
    pub fn transport(&self) -> EmulatorTransport {
        EmulatorTransport {
            e: self.clone(),
            tx: TxState::default(),
            pending: None,
        }
    }

    /// Create a device handle for this emulator
    pub fn handle(&self, cfg: HandleConfig) -> DeviceHandle<EmulatorTransport> {
        DeviceHandle::new(self.transport(), cfg)
    }

    /// Create an approver selecting `outcome` on the emulated device
    pub fn approver(
        &self,
        outcome: Approval,
    ) -> impl Fn() -> futures::future::Ready<anyhow::Result<Approval>> + Send + Sync {
        let inner = self.inner.clone();

        move || {
            let mut i = inner.lock().unwrap();
            i.events.push(Event::Approval(outcome));
            i.decision = Some(outcome);

            futures::future::ready(Ok(outcome))
        }
    }

    /// Fetch recorded events
    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().unwrap().events.clone()
    }

    /// Clear recorded events and any unused approval decision
    pub fn clear(&self) {
        let mut i = self.inner.lock().unwrap();
        i.events.clear();
        i.decision = None;
    }

    /// Derive the signing key and chain code for a path
    pub fn derive(&self, path: &DerivationPath) -> (SigningKey, [u8; 32]) {
        let mut buff = [0u8; 64];
        let n = path.encode(&mut buff).unwrap();

        let s = self.master.sign(&buff[..n]).to_bytes();

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&s[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&s[32..]);

        (SigningKey::from_bytes(&seed), chain_code)
    }

    /// Fetch the expected public key bytes for a path
    pub fn public_key(&self, path: &DerivationPath) -> Vec<u8> {
        let (k, _) = self.derive(path);

        let mut key = vec![PUBLIC_KEY_PREFIX];
        key.extend_from_slice(k.verifying_key().as_bytes());
        key
    }
}

fn encode(v: &impl Encode<Error = ApduError>) -> Vec<u8> {
    let mut buff = vec![0u8; v.encode_len().unwrap()];
    let n = v.encode(&mut buff).unwrap();
    buff.truncate(n);
    buff
}

fn status(sw: StatusWord) -> Pending {
    Pending::Ready(sw.into(), vec![])
}

impl EmulatorTransport {
    fn handle_frame(&mut self, frame: &[u8]) -> Pending {
        let (h, payload) = match decode_frame(frame) {
            Ok(v) => v,
            Err(_) => return status(StatusWord::WrongDataLength),
        };

        self.e
            .inner
            .lock()
            .unwrap()
            .events
            .push(Event::Frame(h.ins, h.p1, h.p2));

        let ins = match (h.instruction(), h.cla) {
            (Some(i), _) => i,
            (None, APTOS_APDU_CLA | BOLOS_APDU_CLA) => return status(StatusWord::InsNotSupported),
            (None, _) => return status(StatusWord::ClaNotSupported),
        };

        let (major, minor, patch) = APP_VERSION;
        let version = format!("{major}.{minor}.{patch}");

        match ins {
            Instruction::GetAppAndVersion => {
                Pending::Ready(0x9000, encode(&AppAndVersionResp::new(APP_NAME, &version)))
            }
            Instruction::GetVersion => Pending::Ready(
                0x9000,
                encode(&VersionResp {
                    major,
                    minor,
                    patch,
                }),
            ),
            Instruction::GetAppName => {
                Pending::Ready(0x9000, encode(&AppNameResp { name: APP_NAME }))
            }
            Instruction::GetPublicKey => {
                let path = match DerivationPath::decode_owned(payload) {
                    Ok((p, n)) if n == payload.len() => p,
                    _ => return status(StatusWord::WrongDataLength),
                };

                match h.p1 {
                    0x00 => self.public_key_resp(&path),
                    0x01 => Pending::PublicKey(path),
                    _ => status(StatusWord::WrongP1P2),
                }
            }
            Instruction::SignTransaction => self.sign_chunk(h.p1, h.p2, payload),
        }
    }

    /// Signing chunks, handled as the Aptos app does: the first chunk sets
    /// the path and is acknowledged regardless of its flags, any data after
    /// the path is discarded. Subsequent chunks accumulate until the last.
    fn sign_chunk(&mut self, p1: u8, p2: u8, payload: &[u8]) -> Pending {
        let more = match ChunkFlags::from_bits(p2) {
            Some(f) if f.is_empty() => false,
            Some(f) if f == ChunkFlags::MORE => true,
            _ => return status(StatusWord::WrongP1P2),
        };

        if p1 == 0 {
            self.tx = TxState::default();

            let (path, n) = match DerivationPath::decode_owned(payload) {
                Ok(v) => v,
                Err(_) => return status(StatusWord::WrongDataLength),
            };
            if n < payload.len() {
                debug!("emulator discarding {} bytes after path", payload.len() - n);
            }

            self.tx.path = Some(path);
            self.tx.seq = 1;

            return Pending::Ready(0x9000, vec![]);
        }

        if self.tx.path.is_none() {
            return status(StatusWord::BadState);
        }
        if p1 != self.tx.seq {
            return status(StatusWord::WrongP1P2);
        }
        if self.tx.data.len() + payload.len() > self.e.max_tx_len {
            return status(StatusWord::WrongTxLength);
        }

        self.tx.data.extend_from_slice(payload);
        self.tx.seq = p1.wrapping_add(1);

        if more {
            return Pending::Ready(0x9000, vec![]);
        }

        let tx = core::mem::take(&mut self.tx);
        match tx.path {
            Some(p) => Pending::Sign(p, tx.data),
            None => status(StatusWord::BadState),
        }
    }

    fn public_key_resp(&self, path: &DerivationPath) -> Pending {
        let (_, chain_code) = self.e.derive(path);
        let key = self.e.public_key(path);

        Pending::Ready(0x9000, encode(&PublicKeyResp::new(&key, &chain_code)))
    }

    /// Await the approval decision, as the device blocks on user input
    async fn decision(&self) -> Approval {
        loop {
            if let Some(d) = self.e.inner.lock().unwrap().decision.take() {
                return d;
            }

            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Transport for EmulatorTransport {
    type Error = std::io::Error;

    async fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if self.pending.is_some() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "send with response pending",
            ));
        }

        let p = self.handle_frame(frame);
        self.pending = Some(p);

        Ok(())
    }

    async fn receive(&mut self) -> Result<(u16, Vec<u8>), Self::Error> {
        let p = match self.pending.take() {
            Some(p) => p,
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "receive without request",
                ))
            }
        };

        let r = match p {
            Pending::Ready(sw, body) => (sw, body),
            Pending::PublicKey(path) => match self.decision().await {
                Approval::Approved => match self.public_key_resp(&path) {
                    Pending::Ready(sw, body) => (sw, body),
                    _ => (StatusWord::BadState.into(), vec![]),
                },
                Approval::Rejected => (StatusWord::Deny.into(), vec![]),
            },
            Pending::Sign(path, data) => match self.decision().await {
                Approval::Approved => {
                    let (k, _) = self.e.derive(&path);
                    let sig = k.sign(&data).to_bytes();

                    (0x9000, encode(&SignatureResp::new(&sig)))
                }
                Approval::Rejected => (StatusWord::Deny.into(), vec![]),
            },
        };

        debug!("emulator response: 0x{:04x} {}", r.0, hex::encode(&r.1));

        Ok(r)
    }
}

/// Setup logging for tests
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}

/// Setup an emulator with a fixed seed and a handle with the provided config
pub fn setup(cfg: HandleConfig) -> (Emulator, DeviceHandle<EmulatorTransport>) {
    setup_logging();

    let e = Emulator::new([0x42; 32]);
    let d = e.handle(cfg);

    (e, d)
}

/// Index of the first approval event
pub fn approval_index(events: &[Event]) -> Option<usize> {
    events.iter().position(|e| matches!(e, Event::Approval(_)))
}

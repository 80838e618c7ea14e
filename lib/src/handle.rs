// Copyright (c) 2022-2023 Aptos Labs

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the Aptos application
//! and is generic over [Transport]

use std::{sync::Arc, time::Duration};

use encdec::{Decode, DecodeOwned};
use log::debug;
use serde::Serialize;
use tokio::sync::Mutex;

use ledger_aptos_apdu::{
    app_info::{
        AppAndVersionReq, AppAndVersionResp, AppNameReq, AppNameResp, VersionReq, VersionResp,
    },
    chunk::{ChunkBuilder, ChunkLayout},
    frame::request_to_frame,
    path::DerivationPath,
    public_key::{PublicKeyReq, PublicKeyResp},
    sign::SignatureResp,
    MAX_APDU_PAYLOAD,
};

use crate::{
    approver::Approver,
    keys::{PublicKey, Signature},
    session::Session,
    transport::Transport,
    Error,
};

/// Device handle configuration
#[derive(Clone, Debug, PartialEq)]
pub struct HandleConfig {
    /// Timeout for each APDU exchange
    pub request_timeout: Duration,

    /// Timeout for user approval (`None` waits forever)
    pub user_timeout: Option<Duration>,

    /// Maximum payload per signing frame
    pub max_payload: usize,

    /// Signing chunk layout
    ///
    /// The Aptos app reads only the path from the first chunk, so devices
    /// require [ChunkLayout::Dedicated].
    pub layout: ChunkLayout,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            user_timeout: Some(Duration::from_secs(30)),
            max_payload: MAX_APDU_PAYLOAD,
            layout: ChunkLayout::Dedicated,
        }
    }
}

/// Aptos handle for a connected ledger [Transport].
///
/// This is generic over [Transport] types to support different
/// underlying transports / providers. Each operation holds the
/// transport lock for its full duration.
pub struct DeviceHandle<T: Transport> {
    /// Transport for communication
    t: Arc<Mutex<T>>,
    /// Handle configuration
    cfg: HandleConfig,
}

impl<T: Transport> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            cfg: self.cfg.clone(),
        }
    }
}

/// Create a [DeviceHandle] wrapper from a type implementing [Transport]
impl<T: Transport> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self::new(t, HandleConfig::default())
    }
}

/// Running application and version
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Application version
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl std::fmt::Display for AppVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl<T: Transport> DeviceHandle<T> {
    /// Create a new handle with the provided configuration
    pub fn new(t: T, cfg: HandleConfig) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            cfg,
        }
    }

    /// Replace handle configuration
    pub fn with_config(mut self, cfg: HandleConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Fetch handle configuration
    pub fn config(&self) -> &HandleConfig {
        &self.cfg
    }

    /// Fetch running application name and version (BOLOS)
    pub async fn app_and_version(&self) -> Result<AppInfo, Error<T::Error>> {
        debug!("Requesting app and version");

        let body = self.request(&AppAndVersionReq).await?;
        let (resp, _) = AppAndVersionResp::decode(&body)?;

        Ok(AppInfo {
            name: resp.name.to_string(),
            version: resp.version.to_string(),
        })
    }

    /// Fetch application version
    pub async fn version(&self) -> Result<AppVersion, Error<T::Error>> {
        debug!("Requesting app version");

        let body = self.request(&VersionReq).await?;
        let (v, _) = VersionResp::decode_owned(&body)?;

        Ok(AppVersion {
            major: v.major,
            minor: v.minor,
            patch: v.patch,
        })
    }

    /// Fetch application name
    pub async fn app_name(&self) -> Result<String, Error<T::Error>> {
        debug!("Requesting app name");

        let body = self.request(&AppNameReq).await?;
        let (resp, _) = AppNameResp::decode(&body)?;

        Ok(resp.name.to_string())
    }

    /// Fetch the public key and chain code for a derivation path
    pub async fn public_key(&self, path: &DerivationPath) -> Result<PublicKey, Error<T::Error>> {
        debug!("Requesting public key for path: {}", path);

        let body = self.request(&PublicKeyReq::new(path.clone(), false)).await?;

        decode_public_key(&body)
    }

    /// Fetch the public key for a derivation path, displaying the address
    /// on the device for confirmation
    pub async fn public_key_with_confirmation(
        &self,
        path: &DerivationPath,
        approver: &impl Approver,
    ) -> Result<PublicKey, Error<T::Error>> {
        debug!("Requesting public key with confirmation for path: {}", path);

        let f = request_to_frame(&PublicKeyReq::new(path.clone(), true))?;

        let mut t = self.t.lock().await;
        let body = self
            .session(&mut t)
            .run(&[f], Some(approver))
            .await?;

        decode_public_key(&body)
    }

    /// Sign a transaction (or raw message) with the key for a derivation path
    pub async fn sign_transaction(
        &self,
        path: &DerivationPath,
        data: &[u8],
        approver: &impl Approver,
    ) -> Result<Signature, Error<T::Error>> {
        let chunks = ChunkBuilder::new(self.cfg.max_payload, self.cfg.layout).build(path, data)?;

        debug!(
            "Signing {} bytes for path: {} ({} chunks)",
            data.len(),
            path,
            chunks.len()
        );

        let frames = chunks
            .iter()
            .map(request_to_frame)
            .collect::<Result<Vec<_>, _>>()?;

        let mut t = self.t.lock().await;
        let body = self
            .session(&mut t)
            .run(&frames, Some(approver))
            .await?;

        let (resp, _) = SignatureResp::decode(&body)?;

        Ok(Signature::new(resp.signature))
    }

    /// Issue a single non-interactive request, returning the response body
    async fn request(
        &self,
        req: &impl ledger_aptos_apdu::ApduReq,
    ) -> Result<Vec<u8>, Error<T::Error>> {
        let mut t = self.t.lock().await;
        self.session(&mut t).request(req).await
    }

    fn session<'a>(&self, t: &'a mut T) -> Session<'a, T> {
        Session::new(t, self.cfg.request_timeout, self.cfg.user_timeout)
    }
}

fn decode_public_key<E: std::fmt::Display + std::fmt::Debug>(
    body: &[u8],
) -> Result<PublicKey, Error<E>> {
    let (resp, _) = PublicKeyResp::decode(body)?;
    Ok(PublicKey::new(resp.public_key, resp.chain_code))
}

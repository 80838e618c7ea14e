// Copyright (c) 2022-2023 Aptos Labs

//! Public key and signature results

use ed25519_dalek::{SignatureError, Verifier, VerifyingKey};
use serde::Serialize;

/// Prefix byte preceding the ed25519 key in public key responses
pub const PUBLIC_KEY_PREFIX: u8 = 0x04;

/// Public key and chain code returned by the device
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicKey {
    /// Public key bytes (prefix byte + ed25519 key)
    #[serde(with = "hex_bytes")]
    pub key: Vec<u8>,
    /// BIP-32 chain code
    #[serde(with = "hex_bytes")]
    pub chain_code: Vec<u8>,
}

impl PublicKey {
    pub fn new(key: &[u8], chain_code: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            chain_code: chain_code.to_vec(),
        }
    }

    /// Fetch the raw ed25519 key bytes (without prefix)
    pub fn ed25519_bytes(&self) -> &[u8] {
        match self.key.split_first() {
            Some((&PUBLIC_KEY_PREFIX, k)) => k,
            _ => &self.key,
        }
    }

    /// Convert to an ed25519 verifying key
    pub fn verifying_key(&self) -> Result<VerifyingKey, SignatureError> {
        let b: &[u8; 32] = self
            .ed25519_bytes()
            .try_into()
            .map_err(|_| SignatureError::new())?;

        VerifyingKey::from_bytes(b)
    }
}

/// Transaction / message signature returned by the device
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Signature {
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

impl Signature {
    pub fn new(signature: &[u8]) -> Self {
        Self {
            signature: signature.to_vec(),
        }
    }

    /// Verify this signature over `message` using the provided public key
    pub fn verify(&self, key: &PublicKey, message: &[u8]) -> Result<(), SignatureError> {
        let vk = key.verifying_key()?;
        let sig = ed25519_dalek::Signature::from_slice(&self.signature)?;

        vk.verify(message, &sig)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.signature
    }
}

/// Hex encoding for serialised outputs
mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(v: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(v))
    }
}

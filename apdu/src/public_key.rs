// Copyright (c) 2022-2023 Aptos Labs

//! Public key APDUs

use encdec::{Decode, DecodeOwned, Encode};

use crate::{path::DerivationPath, read_prefixed, ApduError, ApduStatic, Instruction};

/// Expected public key length (prefix byte + 32-byte ed25519 key)
pub const PUBLIC_KEY_LEN: usize = 33;

/// Expected chain code length
pub const CHAIN_CODE_LEN: usize = 32;

/// Public key request APDU, setting `display` asks the device to show the
/// address and wait for user approval before responding.
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     COUNT     |               PATH_COMPONENTS (BE)            /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PublicKeyReq {
    /// Derivation path
    pub path: DerivationPath,

    /// Display address and request confirmation (`P1 = 0x01`)
    pub display: bool,
}

impl PublicKeyReq {
    /// Create a new public key request
    pub fn new(path: DerivationPath, display: bool) -> Self {
        Self { path, display }
    }
}

impl ApduStatic for PublicKeyReq {
    const CLA: u8 = Instruction::GetPublicKey.cla();

    const INS: u8 = Instruction::GetPublicKey.ins();

    fn p1(&self) -> u8 {
        self.display as u8
    }
}

impl Encode for PublicKeyReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        self.path.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        self.path.encode(buff)
    }
}

impl DecodeOwned for PublicKeyReq {
    type Output = Self;

    type Error = ApduError;

    /// Decode the request payload, `display` is carried in `P1` and must be
    /// set by the caller
    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let (path, n) = DerivationPath::decode_owned(buff)?;
        Ok((
            Self {
                path,
                display: false,
            },
            n,
        ))
    }
}

/// Public key response APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    KEY_LEN    |             PUBLIC_KEY (KEY_LEN)              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   CHAIN_LEN   |             CHAIN_CODE (CHAIN_LEN)            /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PublicKeyResp<'a> {
    /// Public key bytes (prefix byte followed by the ed25519 key)
    pub public_key: &'a [u8],

    /// BIP-32 chain code
    pub chain_code: &'a [u8],
}

impl<'a> PublicKeyResp<'a> {
    /// Create a new public key response
    pub fn new(public_key: &'a [u8], chain_code: &'a [u8]) -> Self {
        Self {
            public_key,
            chain_code,
        }
    }
}

impl<'a> Encode for PublicKeyResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(2 + self.public_key.len() + self.chain_code.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.encode_len()?;
        if buff.len() < n
            || self.public_key.len() > u8::MAX as usize
            || self.chain_code.len() > u8::MAX as usize
        {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[index] = self.public_key.len() as u8;
        buff[index + 1..][..self.public_key.len()].copy_from_slice(self.public_key);
        index += 1 + self.public_key.len();

        buff[index] = self.chain_code.len() as u8;
        buff[index + 1..][..self.chain_code.len()].copy_from_slice(self.chain_code);
        index += 1 + self.chain_code.len();

        Ok(index)
    }
}

impl<'a> Decode<'a> for PublicKeyResp<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a public key response, declared lengths must account for the
    /// whole body
    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        let (public_key, rest) = read_prefixed(buff)?;
        let (chain_code, rest) = read_prefixed(rest)?;

        if !rest.is_empty() {
            return Err(ApduError::MalformedResponse);
        }

        Ok((
            Self {
                public_key,
                chain_code,
            },
            buff.len(),
        ))
    }
}

// Copyright (c) 2022-2023 Aptos Labs

//! Transaction signature response
//!
//! See [crate::chunk] for the request side.

use encdec::{Decode, Encode};

use crate::{read_prefixed, ApduError};

/// Expected ed25519 signature length
pub const SIGNATURE_LEN: usize = 64;

/// Signature response APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    SIG_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+            SIGNATURE (SIG_LEN)                +
/// /                                                               /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SignatureResp<'a> {
    /// Raw signature bytes
    pub signature: &'a [u8],
}

impl<'a> SignatureResp<'a> {
    /// Create a new signature response
    pub fn new(signature: &'a [u8]) -> Self {
        Self { signature }
    }
}

impl<'a> Encode for SignatureResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + self.signature.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.encode_len()?;
        if buff.len() < n || self.signature.len() > u8::MAX as usize {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.signature.len() as u8;
        buff[1..n].copy_from_slice(self.signature);

        Ok(n)
    }
}

impl<'a> Decode<'a> for SignatureResp<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a signature response, the body must be exactly `1 + SIG_LEN` bytes
    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        let (signature, rest) = read_prefixed(buff)?;
        if !rest.is_empty() {
            return Err(ApduError::MalformedResponse);
        }

        Ok((Self { signature }, buff.len()))
    }
}

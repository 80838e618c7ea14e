// Copyright (c) 2022-2023 Aptos Labs

//! BIP-32 derivation paths
//!
//! Paths are accepted in the conventional text form (`m/44'/637'/1'/0'/0'`)
//! and encoded for the device as a component count followed by big-endian
//! 32-bit words, with bit 31 set on hardened components.
//!
//! ## Encoding:
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     COUNT     |                 COMPONENT_0 (BE)              /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /               |                      ...                      /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::{fmt::Display, str::FromStr};

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};

use crate::ApduError;

/// Maximum supported path depth
pub const MAX_BIP32_PATH: usize = 10;

/// Hardened component flag
pub const HARDENED: u32 = 0x8000_0000;

/// Aptos SLIP-0044 coin type
pub const APTOS_COIN_TYPE: u32 = 637;

/// BIP-32 derivation path
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DerivationPath {
    components: heapless::Vec<u32, MAX_BIP32_PATH>,
}

impl DerivationPath {
    /// Create a path from raw component words (hardened bit included)
    pub fn new(components: &[u32]) -> Result<Self, ApduError> {
        let components =
            heapless::Vec::from_slice(components).map_err(|_| ApduError::PathTooLong)?;
        Ok(Self { components })
    }

    /// Standard Aptos account path `m/44'/637'/{account}'/0'/0'`
    pub fn aptos(account: u32) -> Result<Self, ApduError> {
        if account & HARDENED != 0 {
            return Err(ApduError::InvalidPath);
        }

        Self::new(&[
            44 | HARDENED,
            APTOS_COIN_TYPE | HARDENED,
            account | HARDENED,
            HARDENED,
            HARDENED,
        ])
    }

    /// Fetch raw component words
    pub fn as_words(&self) -> &[u32] {
        &self.components
    }

    /// Iterate over `(index, hardened)` pairs
    pub fn components(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        self.components
            .iter()
            .map(|c| (c & !HARDENED, c & HARDENED != 0))
    }

    /// Number of path components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check whether the path is empty (master key)
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromStr for DerivationPath {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Strip optional master prefix
        let s = match s {
            "m" | "" => return Ok(Self::default()),
            _ => s.strip_prefix("m/").unwrap_or(s),
        };

        let mut components = heapless::Vec::new();

        for c in s.split('/') {
            let (v, hardened) = match c.strip_suffix('\'').or_else(|| c.strip_suffix('h')) {
                Some(v) => (v, true),
                None => (c, false),
            };

            // Reject signs / whitespace that `u32::from_str` would otherwise accept
            if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ApduError::InvalidPath);
            }

            let index = u32::from_str(v).map_err(|_| ApduError::InvalidPath)?;
            if index & HARDENED != 0 {
                return Err(ApduError::InvalidPath);
            }

            let word = match hardened {
                true => index | HARDENED,
                false => index,
            };

            components
                .push(word)
                .map_err(|_| ApduError::PathTooLong)?;
        }

        Ok(Self { components })
    }
}

impl Display for DerivationPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "m")?;
        for (index, hardened) in self.components() {
            match hardened {
                true => write!(f, "/{index}'")?,
                false => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

impl Encode for DerivationPath {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + 4 * self.components.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.components.len() as u8;
        for (i, c) in self.components.iter().enumerate() {
            BigEndian::write_u32(&mut buff[1 + i * 4..][..4], *c);
        }

        Ok(n)
    }
}

impl DecodeOwned for DerivationPath {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let count = match buff.first() {
            Some(c) => *c as usize,
            None => return Err(ApduError::InvalidLength),
        };

        if count > MAX_BIP32_PATH {
            return Err(ApduError::PathTooLong);
        }

        let n = 1 + count * 4;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        let mut components = heapless::Vec::new();
        for i in 0..count {
            let w = BigEndian::read_u32(&buff[1 + i * 4..][..4]);
            // Capacity checked above
            let _ = components.push(w);
        }

        Ok((Self { components }, n))
    }
}

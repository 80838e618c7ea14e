// Copyright (c) 2022-2023 Aptos Labs

//! Protocol / APDU definitions for Aptos app communication
//!
//! This module provides the wire protocol used by hosts to talk to the Aptos
//! Ledger application: the instruction table, status words, the APDU frame
//! codec, BIP-32 derivation paths, chunking for transactions larger than a
//! single APDU, and decoders for each response type.
//!
//! Unlike the little-endian encodings common in other apps, the Aptos app
//! follows the Ledger boilerplate conventions: derivation path components and
//! status words are big-endian, and variable length fields carry a single
//! byte length prefix.
//!

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use core::fmt::Debug;

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

pub mod app_info;
#[cfg(feature = "alloc")]
pub mod chunk;
pub mod frame;
pub mod path;
pub mod prelude;
pub mod public_key;
pub mod sign;
pub mod status;

mod error;
pub use error::ApduError;

/// Aptos APDU Class
pub const APTOS_APDU_CLA: u8 = 0x5b;

/// BOLOS (dashboard / OS) APDU Class, used for app and version queries
pub const BOLOS_APDU_CLA: u8 = 0xb0;

/// Maximum APDU payload length (single byte length field)
pub const MAX_APDU_PAYLOAD: usize = 255;

/// APDU header length (CLA, INS, P1, P2, LC)
pub const APDU_HEADER_LEN: usize = 5;

/// Aptos APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch running application name and version (BOLOS class)
    GetAppAndVersion = 0x01,

    /// Fetch application version (major, minor, patch)
    GetVersion = 0x03,

    /// Fetch application name
    GetAppName = 0x04,

    /// Fetch ed25519 public key and chain code for a BIP-32 path
    GetPublicKey = 0x05,

    /// Sign a (chunked) transaction with the key for a BIP-32 path
    SignTransaction = 0x06,
}

impl Instruction {
    /// Fetch the class byte for an instruction
    pub const fn cla(&self) -> u8 {
        match self {
            Instruction::GetAppAndVersion => BOLOS_APDU_CLA,
            _ => APTOS_APDU_CLA,
        }
    }

    /// Fetch the instruction byte
    pub const fn ins(&self) -> u8 {
        *self as u8
    }

    /// Resolve an instruction from class and instruction bytes
    pub fn from_header(cla: u8, ins: u8) -> Option<Self> {
        let i = Self::try_from(ins).ok()?;
        match i.cla() == cla {
            true => Some(i),
            false => None,
        }
    }
}

/// Static APDU header information for request types
pub trait ApduStatic {
    /// Class ID for APDU commands
    const CLA: u8;

    /// Instruction ID for APDU commands
    const INS: u8;

    /// Fetch P1 value (defaults to `0`)
    fn p1(&self) -> u8 {
        0
    }

    /// Fetch P2 value (defaults to `0`)
    fn p2(&self) -> u8 {
        0
    }
}

/// Generic APDU request, encodable with a header
pub trait ApduReq: encdec::Encode<Error = ApduError> + Debug {
    /// Fetch the header for this request
    fn header(&self) -> frame::ApduHeader;
}

/// Blanket [ApduReq] impl for [ApduStatic] types
impl<T: ApduStatic + encdec::Encode<Error = ApduError> + Debug> ApduReq for T {
    fn header(&self) -> frame::ApduHeader {
        frame::ApduHeader {
            cla: T::CLA,
            ins: T::INS,
            p1: self.p1(),
            p2: self.p2(),
        }
    }
}

/// Helper for reading a length-prefixed field, returning the field and the
/// remainder of the buffer.
pub(crate) fn read_prefixed(buff: &[u8]) -> Result<(&[u8], &[u8]), ApduError> {
    let (len, rest) = match buff.split_first() {
        Some((l, r)) => (*l as usize, r),
        None => return Err(ApduError::MalformedResponse),
    };

    if rest.len() < len {
        return Err(ApduError::MalformedResponse);
    }

    Ok(rest.split_at(len))
}

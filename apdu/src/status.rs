// Copyright (c) 2022-2023 Aptos Labs

//! Status words returned by the Aptos application

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

/// Known status words, see [StatusWord::from_raw] for decoding.
///
/// Unknown values are preserved as raw `u16` by callers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumIter, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusWord {
    /// Success
    Ok = 0x9000,
    /// Rejected by the user on device
    Deny = 0x6985,
    /// Incorrect P1 or P2 (including out of order chunks)
    WrongP1P2 = 0x6a86,
    /// Incorrect data length
    WrongDataLength = 0x6a87,
    /// Unknown instruction
    InsNotSupported = 0x6d00,
    /// Unknown class
    ClaNotSupported = 0x6e00,
    /// Response would exceed the APDU buffer
    WrongResponseLength = 0xb000,
    /// Failed to display the BIP-32 path
    DisplayBip32PathFail = 0xb001,
    /// Failed to display the address
    DisplayAddressFail = 0xb002,
    /// Failed to display the amount
    DisplayAmountFail = 0xb003,
    /// Transaction exceeds the device buffer
    WrongTxLength = 0xb004,
    /// Transaction could not be parsed
    TxParsingFail = 0xb005,
    /// Transaction hash failed
    TxHashFail = 0xb006,
    /// Command issued in the wrong state
    BadState = 0xb007,
    /// Signing failed
    SignatureFail = 0xb008,
}

impl StatusWord {
    /// Decode a raw status word, returning `None` for unknown values
    pub fn from_raw(v: u16) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Check whether a raw status word indicates success
    pub const fn is_ok(v: u16) -> bool {
        v == StatusWord::Ok as u16
    }
}

impl From<StatusWord> for u16 {
    fn from(s: StatusWord) -> Self {
        s as u16
    }
}

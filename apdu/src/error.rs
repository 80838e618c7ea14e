// Copyright (c) 2022-2023 Aptos Labs

use strum::Display;

/// APDU encode / decode errors
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum ApduError {
    /// Payload exceeds the maximum APDU payload length
    PayloadTooLarge,

    /// Response length fields are inconsistent with the response size
    MalformedResponse,

    /// Buffer too short for encoding
    InvalidLength,

    /// Invalid UTF-8 / ASCII string
    InvalidUtf8,

    /// Derivation path could not be parsed
    InvalidPath,

    /// Derivation path exceeds the supported depth
    PathTooLong,

    /// Chunk sequence number would overflow P1
    TooManyChunks,
}

#[cfg(feature = "std")]
impl std::error::Error for ApduError {}

impl From<encdec::Error> for ApduError {
    fn from(_: encdec::Error) -> Self {
        ApduError::InvalidLength
    }
}

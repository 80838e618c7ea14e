// Copyright (c) 2022-2023 Aptos Labs

use core::fmt::Debug;
use std::fmt::Display;

use ledger_aptos_apdu::{status::StatusWord, ApduError};
use tokio::time::error::Elapsed;

/// Ledger Aptos API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error<E: Display + Debug> {
    /// Payload exceeds the APDU limit, nothing was sent
    #[error("Payload too large for a single APDU")]
    PayloadTooLarge,

    /// Device returned a non-success status word
    #[error("Device error {} (status: 0x{status:04x}, ins: 0x{ins:02x})", status_name(.status))]
    Device { status: u16, ins: u8 },

    /// User denied operation
    #[error("Operation rejected by user")]
    UserDenied,

    /// Response length fields inconsistent with the response
    #[error("Malformed APDU response")]
    MalformedResponse,

    /// Transport error
    #[error("Transport error {0}")]
    Transport(E),

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// Timeout waiting for user
    #[error("Timeout waiting for user interaction")]
    UserTimeout,

    /// Approval driver failed
    #[error("Approval failed: {0}")]
    Approver(anyhow::Error),

    /// Local APDU encoding error
    #[error("APDU error: {0}")]
    Apdu(ApduError),
}

fn status_name(status: &u16) -> &'static str {
    match StatusWord::from_raw(*status) {
        Some(StatusWord::Ok) => "OK",
        Some(StatusWord::Deny) => "DENY",
        Some(StatusWord::WrongP1P2) => "WRONG_P1P2",
        Some(StatusWord::WrongDataLength) => "WRONG_DATA_LENGTH",
        Some(StatusWord::InsNotSupported) => "INS_NOT_SUPPORTED",
        Some(StatusWord::ClaNotSupported) => "CLA_NOT_SUPPORTED",
        Some(StatusWord::WrongResponseLength) => "WRONG_RESPONSE_LENGTH",
        Some(StatusWord::DisplayBip32PathFail) => "DISPLAY_BIP32_PATH_FAIL",
        Some(StatusWord::DisplayAddressFail) => "DISPLAY_ADDRESS_FAIL",
        Some(StatusWord::DisplayAmountFail) => "DISPLAY_AMOUNT_FAIL",
        Some(StatusWord::WrongTxLength) => "WRONG_TX_LENGTH",
        Some(StatusWord::TxParsingFail) => "TX_PARSING_FAIL",
        Some(StatusWord::TxHashFail) => "TX_HASH_FAIL",
        Some(StatusWord::BadState) => "BAD_STATE",
        Some(StatusWord::SignatureFail) => "SIGNATURE_FAIL",
        None => "UNKNOWN",
    }
}

impl<E: Display + Debug> Error<E> {
    /// Fetch the decoded status word for device errors
    pub fn status(&self) -> Option<StatusWord> {
        match self {
            Error::Device { status, .. } => StatusWord::from_raw(*status),
            Error::UserDenied => Some(StatusWord::Deny),
            _ => None,
        }
    }
}

impl<E: Display + Debug> From<Elapsed> for Error<E> {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl<E: Display + Debug> From<ApduError> for Error<E> {
    fn from(e: ApduError) -> Self {
        match e {
            ApduError::PayloadTooLarge => Error::PayloadTooLarge,
            ApduError::MalformedResponse => Error::MalformedResponse,
            _ => Error::Apdu(e),
        }
    }
}

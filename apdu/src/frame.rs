// Copyright (c) 2022-2023 Aptos Labs

//! APDU frame codec
//!
//! ## Command encoding
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      CLA      |      INS      |      P1       |      P2       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      LC       |                                               |
//! +-+-+-+-+-+-+-+-+                                               +
//! /                     PAYLOAD (LC bytes)                        /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! ## Response encoding
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                       BODY (variable)                         /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |        STATUS_WORD (BE)       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use encdec::Encode;

use crate::{ApduError, ApduReq, Instruction, APDU_HEADER_LEN, MAX_APDU_PAYLOAD};

/// APDU command header
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ApduHeader {
    /// Class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// First parameter
    pub p1: u8,
    /// Second parameter
    pub p2: u8,
}

impl ApduHeader {
    /// Create a header for a known instruction, deriving the class byte
    pub const fn new(ins: Instruction, p1: u8, p2: u8) -> Self {
        Self {
            cla: ins.cla(),
            ins: ins.ins(),
            p1,
            p2,
        }
    }

    /// Resolve the [Instruction] for this header, if known
    pub fn instruction(&self) -> Option<Instruction> {
        Instruction::from_header(self.cla, self.ins)
    }
}

/// Encode a command frame (header + length + payload) into the provided buffer
pub fn encode_frame(h: &ApduHeader, payload: &[u8], buff: &mut [u8]) -> Result<usize, ApduError> {
    if payload.len() > MAX_APDU_PAYLOAD {
        return Err(ApduError::PayloadTooLarge);
    }

    let n = APDU_HEADER_LEN + payload.len();
    if buff.len() < n {
        return Err(ApduError::InvalidLength);
    }

    buff[0] = h.cla;
    buff[1] = h.ins;
    buff[2] = h.p1;
    buff[3] = h.p2;
    buff[4] = payload.len() as u8;
    buff[APDU_HEADER_LEN..][..payload.len()].copy_from_slice(payload);

    Ok(n)
}

/// Encode a typed [ApduReq] into the provided buffer
pub fn encode_request(req: &impl ApduReq, buff: &mut [u8]) -> Result<usize, ApduError> {
    let len = req.encode_len()?;
    if len > MAX_APDU_PAYLOAD {
        return Err(ApduError::PayloadTooLarge);
    }

    if buff.len() < APDU_HEADER_LEN + len {
        return Err(ApduError::InvalidLength);
    }

    let h = req.header();
    buff[0] = h.cla;
    buff[1] = h.ins;
    buff[2] = h.p1;
    buff[3] = h.p2;
    buff[4] = len as u8;

    let n = req.encode(&mut buff[APDU_HEADER_LEN..][..len])?;

    Ok(APDU_HEADER_LEN + n)
}

/// Encode a command frame into a newly allocated buffer
#[cfg(feature = "alloc")]
pub fn to_frame(h: &ApduHeader, payload: &[u8]) -> Result<alloc::vec::Vec<u8>, ApduError> {
    let mut buff = alloc::vec![0u8; APDU_HEADER_LEN + payload.len()];
    let n = encode_frame(h, payload, &mut buff)?;
    buff.truncate(n);
    Ok(buff)
}

/// Encode a typed [ApduReq] into a newly allocated buffer
#[cfg(feature = "alloc")]
pub fn request_to_frame(req: &impl ApduReq) -> Result<alloc::vec::Vec<u8>, ApduError> {
    let len = req.encode_len()?;
    let mut buff = alloc::vec![0u8; APDU_HEADER_LEN + len];
    let n = encode_request(req, &mut buff)?;
    buff.truncate(n);
    Ok(buff)
}

/// Decode a command frame into header and payload
pub fn decode_frame(raw: &[u8]) -> Result<(ApduHeader, &[u8]), ApduError> {
    if raw.len() < APDU_HEADER_LEN {
        return Err(ApduError::InvalidLength);
    }

    let h = ApduHeader {
        cla: raw[0],
        ins: raw[1],
        p1: raw[2],
        p2: raw[3],
    };

    let len = raw[4] as usize;
    let payload = &raw[APDU_HEADER_LEN..];
    if payload.len() != len {
        return Err(ApduError::InvalidLength);
    }

    Ok((h, payload))
}

/// Split a raw response into status word and body
pub fn decode_response(raw: &[u8]) -> Result<(u16, &[u8]), ApduError> {
    if raw.len() < 2 {
        return Err(ApduError::MalformedResponse);
    }

    let (body, sw) = raw.split_at(raw.len() - 2);
    let sw = u16::from_be_bytes([sw[0], sw[1]]);

    Ok((sw, body))
}

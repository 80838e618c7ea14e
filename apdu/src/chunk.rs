// Copyright (c) 2022-2023 Aptos Labs

//! Chunked transaction signing requests
//!
//! Transactions larger than a single APDU are split into an ordered sequence
//! of [TxChunk] frames. `P1` carries the chunk sequence number (the device
//! rejects gaps), `P2` is [ChunkFlags::MORE] on every frame except the last,
//! which triggers the on-device review.
//!
//! ## Inline layout (default)
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | P1=0 P2=MORE  |  PATH_HEADER (1 + 4n)  |  DATA[..]             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | P1=1 P2=MORE  |  DATA[..]                                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | P1=n P2=LAST  |  DATA[..]                                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! ## Dedicated layout
//! The first frame carries only the path header, data starts at `P1=1`.
//! This is the layout the Aptos app accepts: it acknowledges the first
//! frame once the path is parsed and discards anything following it.

use alloc::vec::Vec;

use encdec::Encode;
use strum::{Display, EnumIter};

use crate::{path::DerivationPath, ApduError, ApduStatic, Instruction, MAX_APDU_PAYLOAD};

/// Maximum number of chunks addressable by the `P1` sequence number
pub const MAX_CHUNKS: usize = u8::MAX as usize + 1;

bitflags::bitflags! {
    /// Chunk `P2` flags
    pub struct ChunkFlags: u8 {
        /// More chunks follow this one
        const MORE = 0x80;
    }
}

/// Placement of transaction data relative to the derivation path
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ChunkLayout {
    /// Path header and leading data share the first frame
    #[default]
    Inline,
    /// First frame carries only the path header
    Dedicated,
}

/// A single transaction chunk APDU
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxChunk {
    /// Chunk sequence number
    pub index: u8,

    /// Chunk flags
    pub flags: ChunkFlags,

    /// Chunk payload (path header and / or transaction data)
    pub payload: Vec<u8>,
}

impl TxChunk {
    /// Check whether this is the first chunk of a sequence
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Check whether this is the final chunk of a sequence
    pub fn is_last(&self) -> bool {
        !self.flags.contains(ChunkFlags::MORE)
    }
}

impl ApduStatic for TxChunk {
    const CLA: u8 = Instruction::SignTransaction.cla();

    const INS: u8 = Instruction::SignTransaction.ins();

    fn p1(&self) -> u8 {
        self.index
    }

    fn p2(&self) -> u8 {
        self.flags.bits()
    }
}

impl Encode for TxChunk {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.payload.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.payload.len();
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[..n].copy_from_slice(&self.payload);

        Ok(n)
    }
}

/// Builder splitting a path and transaction into [TxChunk]s
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkBuilder {
    /// Maximum payload per frame (`1..=255`)
    pub max_payload: usize,

    /// Data placement
    pub layout: ChunkLayout,
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self {
            max_payload: MAX_APDU_PAYLOAD,
            layout: ChunkLayout::Inline,
        }
    }
}

impl ChunkBuilder {
    /// Create a new chunk builder
    pub fn new(max_payload: usize, layout: ChunkLayout) -> Self {
        Self {
            max_payload,
            layout,
        }
    }

    /// Split `path` and `data` into an ordered chunk sequence.
    ///
    /// The returned sequence is never empty, has exactly one first and one
    /// final chunk, and the data carried across all chunks equals `data`.
    pub fn build(&self, path: &DerivationPath, data: &[u8]) -> Result<Vec<TxChunk>, ApduError> {
        let max = self.max_payload;
        if max == 0 || max > MAX_APDU_PAYLOAD {
            return Err(ApduError::PayloadTooLarge);
        }

        let header_len = path.encode_len()?;
        if header_len > max {
            return Err(ApduError::PayloadTooLarge);
        }

        // Data carried alongside the path header
        let inline = match self.layout {
            ChunkLayout::Inline => data.len().min(max - header_len),
            ChunkLayout::Dedicated => 0,
        };
        let (head, rest) = data.split_at(inline);

        // Subsequent data frames, the dedicated layout always sends at least one
        let data_frames = match (self.layout, rest.len()) {
            (ChunkLayout::Dedicated, 0) => 1,
            (_, n) => (n + max - 1) / max,
        };

        let total = 1 + data_frames;
        if total > MAX_CHUNKS {
            return Err(ApduError::TooManyChunks);
        }

        let mut chunks = Vec::with_capacity(total);

        let mut first = alloc::vec![0u8; header_len + head.len()];
        path.encode(&mut first[..header_len])?;
        first[header_len..].copy_from_slice(head);
        chunks.push(first);

        match rest.is_empty() {
            true if data_frames == 1 => chunks.push(Vec::new()),
            true => (),
            false => chunks.extend(rest.chunks(max).map(|c| c.to_vec())),
        }

        let last = chunks.len() - 1;
        let chunks = chunks
            .into_iter()
            .enumerate()
            .map(|(i, payload)| TxChunk {
                index: i as u8,
                flags: match i == last {
                    true => ChunkFlags::empty(),
                    false => ChunkFlags::MORE,
                },
                payload,
            })
            .collect();

        #[cfg(feature = "log")]
        log::debug!("split {} bytes into {} chunks", data.len(), total);

        Ok(chunks)
    }
}

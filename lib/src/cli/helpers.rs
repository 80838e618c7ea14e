// Copyright (c) 2022-2023 Aptos Labs

use std::path::Path;

use log::debug;
use serde::Serialize;

use ledger_aptos::apdu::chunk::ChunkLayout;

/// Variable length hex encoded data
#[derive(Clone, PartialEq, Debug)]
pub struct HexData(pub Vec<u8>);

impl std::str::FromStr for HexData {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);

        hex::decode(s).map(HexData)
    }
}

impl AsRef<[u8]> for HexData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for HexData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Signing chunk layout (CLI form of [ChunkLayout])
#[derive(Copy, Clone, PartialEq, Debug, Default, clap::ValueEnum)]
pub enum Layout {
    /// Path and data share the first frame
    Inline,
    /// Path only in the first frame, as the Aptos app expects
    #[default]
    Dedicated,
}

impl From<Layout> for ChunkLayout {
    fn from(l: Layout) -> Self {
        match l {
            Layout::Inline => ChunkLayout::Inline,
            Layout::Dedicated => ChunkLayout::Dedicated,
        }
    }
}

/// Helper to read hex or binary input files
pub async fn read_input(file_name: &str) -> anyhow::Result<Vec<u8>> {
    debug!("Reading input from '{}'", file_name);

    let p = Path::new(file_name);

    // Decode based on input extension
    let v = match p.extension().and_then(|e| e.to_str()) {
        Some("hex") | Some("txt") => {
            let s = tokio::fs::read_to_string(p).await?;
            s.parse::<HexData>()?.0
        }
        _ => tokio::fs::read(p).await?,
    };

    Ok(v)
}

/// Helper to write output files if `--output` argument is provided
pub async fn write_output(file_name: &str, value: &impl Serialize) -> anyhow::Result<()> {
    debug!("Writing output to '{}'", file_name);

    // Determine format from file name
    let p = Path::new(file_name);
    match p.extension().and_then(|e| e.to_str()) {
        // Encode to JSON for `.json` files
        Some("json") => {
            let s = serde_json::to_string(value)?;
            tokio::fs::write(p, s).await?;
        }
        _ => return Err(anyhow::anyhow!("unsupported output file format")),
    }

    Ok(())
}

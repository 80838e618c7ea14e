// Copyright (c) 2022-2023 Aptos Labs

//! Prelude to simplify downstream use of APDU objects
//!

#[cfg(feature = "alloc")]
pub use crate::chunk::{ChunkBuilder, ChunkFlags, ChunkLayout, TxChunk};
pub use crate::{
    app_info::{
        AppAndVersionReq, AppAndVersionResp, AppNameReq, AppNameResp, VersionReq, VersionResp,
    },
    frame::ApduHeader,
    path::DerivationPath,
    public_key::{PublicKeyReq, PublicKeyResp},
    sign::SignatureResp,
    status::StatusWord,
    ApduError, ApduReq, ApduStatic, Instruction,
};

// Copyright (c) 2022-2023 Aptos Labs

//! Transaction and message signing tests

use log::info;
use strum::{Display, EnumIter, EnumString};

use ledger_aptos::{
    apdu::path::DerivationPath, transport::Transport, Approver, DeviceHandle, Error, Signature,
};

/// Default signing path
pub const SIGN_PATH: &str = "m/44'/637'/1'/0'/0'";

/// Aptos coin transfer, reviewed on device
pub const TRANSFER_TX: &str = "b5e97db07fa0bd0e5598aa3643a9bc6f6693bddc1a9fec9e674a461eaa00b193783135e8b00430253a22ba041d860c373d7a1501ccf7ac2d1ad37a8ed2775aee000000000000000002000000000000000000000000000000000000000000000000000000000000000104636f696e087472616e73666572010700000000000000000000000000000000000000000000000000000000000000010a6170746f735f636f696e094170746f73436f696e000220094c6fc0d3b382a599c37e1aaa7618eff2c96a3586876082c4594c50c50d7dde082a00000000000000204e0000000000006400000000000000565c51630000000022";

/// Script call requiring blind signing
pub const BLIND_TX: &str = "b5e97db07fa0bd0e5598aa3643a9bc6f6693bddc1a9fec9e674a461eaa00b193094c6fc0d3b382a599c37e1aaa7618eff2c96a3586876082c4594c50c50d7dde1b0000000000000002190d44266241744264b964a37b8f09863167a12d3e70cda39376cfb4e3561e120a736372697074735f76320473776170030700000000000000000000000000000000000000000000000000000000000000010a6170746f735f636f696e094170746f73436f696e000743417434fd869edee76cca2a4d2301e528a1551b1d719b75c350c3c97d15b8b905636f696e7304555344540007190d44266241744264b964a37b8f09863167a12d3e70cda39376cfb4e3561e12066375727665730c556e636f7272656c6174656400020800e1f5050000000008decbb30000000000480000000000000064000000000000008a9ba4640000000002";

/// Account transfer, used for refusal tests
pub const REFUSED_TX: &str = "b5e97db07fa0bd0e5598aa3643a9bc6f6693bddc1a9fec9e674a461eaa00b193094c6fc0d3b382a599c37e1aaa7618eff2c96a3586876082c4594c50c50d7dde1b000000000000000200000000000000000000000000000000000000000000000000000000000000010d6170746f735f6163636f756e74087472616e736665720002203835075df1bf469c336eabed8ac87052ee4485f3ec93380a5382fbf76b7a33070840420f000000000006000000000000006400000000000000c39aa4640000000002";

/// UTF-8 message
pub const TEXT_MSG: &str = "Hello Ledger!";

/// Short raw message
pub const RAW_MSG: &str = "01020304ff";

/// Long raw message
pub const LONG_RAW_MSG: &str = "bc6f6693bddc1a9fec9e674a461eaa00b193094c6fc0d3b382a599c37e1aaa7618eff2c96a3586876082c4594c50c50d7dde1b0000000000000002190d44266241744264b964a37b8f09863167a12d3e70cda39376cfb4e3561e120a736372697074735f76320473776170030700000000000000000000000000000000000000000000000000000000000000010a6170746f735f636f696e094170746f73436f696e000743417434fd869edee76cca2a4d2301e528a1551b1d719b75c350c3c97d15b8b905636f696e7304555344540007190d44266241744264b964a37b8f09863167a12d3e70cda39376cfb4e3561e12066375727665730c556e636f7272656c6174656400020800e1f5050000000008decbb30000000000480000000000000064000000000000008a9ba4640000000002";

/// Signing test vectors
#[derive(Copy, Clone, Debug, PartialEq, Display, EnumString, EnumIter, clap::ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Vector {
    Transfer,
    Blind,
    Refused,
    Text,
    Raw,
    LongRaw,
}

impl Vector {
    /// Fetch the bytes to be signed
    pub fn data(&self) -> anyhow::Result<Vec<u8>> {
        let d = match self {
            Vector::Transfer => hex::decode(TRANSFER_TX)?,
            Vector::Blind => hex::decode(BLIND_TX)?,
            Vector::Refused => hex::decode(REFUSED_TX)?,
            Vector::Text => TEXT_MSG.as_bytes().to_vec(),
            Vector::Raw => hex::decode(RAW_MSG)?,
            Vector::LongRaw => hex::decode(LONG_RAW_MSG)?,
        };

        Ok(d)
    }
}

/// Sign `data` with approval, verifying the signature against the public
/// key for `path`
pub async fn test<T: Transport>(
    d: &DeviceHandle<T>,
    path: &DerivationPath,
    data: &[u8],
    approver: &impl Approver,
) -> anyhow::Result<Signature> {
    let k = d.public_key(path).await?;

    info!(
        "signing {} bytes with path: {} (public key: {})",
        data.len(),
        path,
        hex::encode(&k.key)
    );

    let s = d.sign_transaction(path, data, approver).await?;

    info!("signature: {}", hex::encode(&s.signature));

    s.verify(&k, data)?;

    Ok(s)
}

/// Sign `data` expecting refusal
pub async fn test_rejected<T: Transport>(
    d: &DeviceHandle<T>,
    path: &DerivationPath,
    data: &[u8],
    approver: &impl Approver,
) -> anyhow::Result<()> {
    match d.sign_transaction(path, data, approver).await {
        Err(Error::UserDenied) => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("signature returned for rejected request")),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn vector_lengths() {
        let lens: Vec<_> = Vector::iter().map(|v| v.data().unwrap().len()).collect();
        assert_eq!(lens, vec![243, 320, 197, 13, 5, 306]);
    }
}

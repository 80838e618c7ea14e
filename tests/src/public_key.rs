// Copyright (c) 2022-2023 Aptos Labs

//! Public key derivation tests

use log::info;

use ledger_aptos::{
    apdu::{
        path::DerivationPath,
        public_key::{CHAIN_CODE_LEN, PUBLIC_KEY_LEN},
    },
    transport::Transport,
    Approver, DeviceHandle, Error, PublicKey, PUBLIC_KEY_PREFIX,
};

/// Derivation paths exercised by public key tests
pub const PATHS: &[&str] = &[
    "m/44'/637'/1'/0'/0'",
    "m/44'/637'/0'/0'/1'",
    "m/44'/637'/255'/255'/255'",
    "m/44'/637'/2147483647'/0'/0'/0'/0'/0'/0'/0'",
];

/// Parse the default test paths
pub fn paths() -> anyhow::Result<Vec<DerivationPath>> {
    let p = PATHS
        .iter()
        .map(|p| p.parse::<DerivationPath>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(p)
}

/// Fetch public keys for each path, checking these are well formed,
/// stable across requests and distinct between paths
pub async fn test<T: Transport>(
    d: &DeviceHandle<T>,
    paths: &[DerivationPath],
) -> anyhow::Result<Vec<PublicKey>> {
    let mut keys: Vec<PublicKey> = vec![];

    for p in paths {
        info!("requesting public key for path: {}", p);

        let k = d.public_key(p).await?;

        info!("public key: {}", hex::encode(&k.key));
        info!("chain code: {}", hex::encode(&k.chain_code));

        check_key(&k)?;

        // Repeated requests return the same key
        let k1 = d.public_key(p).await?;
        assert_eq!(k, k1, "public key changed between requests");

        // Keys are unique per path
        assert!(!keys.contains(&k), "duplicate key for path {p}");

        keys.push(k);
    }

    Ok(keys)
}

/// Fetch a public key with on-device confirmation, checking this matches
/// the non-interactive request
pub async fn test_display<T: Transport>(
    d: &DeviceHandle<T>,
    path: &DerivationPath,
    approver: &impl Approver,
) -> anyhow::Result<PublicKey> {
    let expected = d.public_key(path).await?;

    info!("requesting public key with confirmation for path: {}", path);

    let k = d.public_key_with_confirmation(path, approver).await?;

    assert_eq!(k, expected);

    Ok(k)
}

/// Request a public key with on-device confirmation, expecting refusal
pub async fn test_display_rejected<T: Transport>(
    d: &DeviceHandle<T>,
    path: &DerivationPath,
    approver: &impl Approver,
) -> anyhow::Result<()> {
    match d.public_key_with_confirmation(path, approver).await {
        Err(Error::UserDenied) => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("public key returned for rejected request")),
        Err(e) => Err(e.into()),
    }
}

/// Check public key and chain code lengths and key validity
pub fn check_key(k: &PublicKey) -> anyhow::Result<()> {
    assert_eq!(k.key.len(), PUBLIC_KEY_LEN);
    assert_eq!(k.key[0], PUBLIC_KEY_PREFIX);
    assert_eq!(k.chain_code.len(), CHAIN_CODE_LEN);

    k.verifying_key()?;

    Ok(())
}

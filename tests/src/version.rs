// Copyright (c) 2022-2023 Aptos Labs

//! Application name and version tests

use log::info;

use ledger_aptos::{transport::Transport, DeviceHandle};

/// Expected application identity
#[derive(Clone, Debug, PartialEq)]
pub struct Expectation<'a> {
    pub app_name: &'a str,
    pub version: &'a str,
}

impl<'a> Default for Expectation<'a> {
    fn default() -> Self {
        Self {
            app_name: "Aptos",
            version: "0.6.9",
        }
    }
}

/// Fetch application name and version via both the BOLOS and app
/// instructions, checking these match the expectation
pub async fn test<T: Transport>(d: &DeviceHandle<T>, expect: &Expectation<'_>) -> anyhow::Result<()> {
    let i = d.app_and_version().await?;
    info!("app and version: {} {}", i.name, i.version);

    assert_eq!(i.name, expect.app_name);
    assert_eq!(i.version, expect.version);

    let v = d.version().await?;
    info!("version: {}", v);

    assert_eq!(v.to_string(), expect.version);

    let n = d.app_name().await?;
    info!("app name: {}", n);

    assert_eq!(n, expect.app_name);

    Ok(())
}

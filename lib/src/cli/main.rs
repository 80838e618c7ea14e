// Copyright (c) 2022-2023 Aptos Labs

//! Command line utility for interacting with the Ledger Aptos app

use std::time::Duration;

use clap::Parser;
use log::{debug, error, info, LevelFilter};

use ledger_aptos::{
    apdu::path::DerivationPath, describe, transport::Transport, DeviceApprover, DeviceHandle,
    Filter, HandleConfig, LedgerProvider,
};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for ledger discovery
    #[clap(long, value_enum, default_value = "any")]
    target: Filter,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Timeout for user approval in seconds (0 to wait forever)
    #[clap(long, default_value = "30")]
    user_timeout_s: u64,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch running application name and version
    AppInfo,

    /// Fetch Aptos application version
    Version,

    /// Fetch Aptos application name
    AppName,

    /// Fetch public key for a derivation path
    PublicKey {
        /// BIP-32 derivation path
        #[clap(long, default_value = "m/44'/637'/0'/0'/0'")]
        path: DerivationPath,

        /// Display the address on the device for confirmation
        #[clap(long)]
        display: bool,

        /// Output file for the public key (`.json`)
        #[clap(long)]
        output: Option<String>,
    },

    /// Sign a transaction or message
    Sign {
        /// BIP-32 derivation path
        #[clap(long, default_value = "m/44'/637'/0'/0'/0'")]
        path: DerivationPath,

        /// Hex encoded data to sign
        #[clap(long, conflicts_with = "file", required_unless_present = "file")]
        data: Option<HexData>,

        /// File containing data to sign (`.hex` or raw binary)
        #[clap(long)]
        file: Option<String>,

        /// Signing chunk layout
        #[clap(long, value_enum, default_value = "dedicated")]
        layout: Layout,

        /// Output file for the signature (`.json`)
        #[clap(long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    // Start device discovery
    let mut p = LedgerProvider::init().await;

    debug!("Using transport: {:?}", args.target);

    // List available devices
    let mut devices = p.list_devices(args.target).await?;
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {}", i, describe(d));
        }

        return Ok(());
    }

    // Select device by index
    if args.device_index >= devices.len() {
        return Err(anyhow::anyhow!(
            "Invalid device index: {} (max: {})",
            args.device_index,
            devices.len() - 1
        ));
    }
    let info = devices.swap_remove(args.device_index);

    debug!("Using device {}: {}", args.device_index, describe(&info));

    // Apply timeouts
    let user_timeout = match args.user_timeout_s {
        0 => None,
        s => Some(Duration::from_secs(s)),
    };
    let cfg = HandleConfig {
        user_timeout,
        ..Default::default()
    };

    // Connect to device
    let d = match p.connect(info.clone(), cfg).await {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to connect to device: {}", describe(&info));
            return Err(e.into());
        }
    };

    // Execute command
    execute(d, args.cmd).await?;

    Ok(())
}

/// Execute a command with the provided device handle
async fn execute<T: Transport>(t: DeviceHandle<T>, cmd: Actions) -> anyhow::Result<()> {
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::AppInfo => {
            let i = t.app_and_version().await?;

            info!("app: {} version: {}", i.name, i.version);
        }
        Actions::Version => {
            let v = t.version().await?;

            info!("version: {}", v);
        }
        Actions::AppName => {
            let n = t.app_name().await?;

            info!("name: {}", n);
        }
        Actions::PublicKey {
            path,
            display,
            output,
        } => {
            info!("Requesting public key for path: {}", path);

            let k = match display {
                true => {
                    info!("Confirm the address on your device");
                    t.public_key_with_confirmation(&path, &DeviceApprover).await?
                }
                false => t.public_key(&path).await?,
            };

            info!("public key: {}", hex::encode(&k.key));
            info!("chain code: {}", hex::encode(&k.chain_code));

            if let Some(o) = output {
                write_output(&o, &k).await?;
            }
        }
        Actions::Sign {
            path,
            data,
            file,
            layout,
            output,
        } => {
            // Load data to be signed
            let data = match (data, file) {
                (Some(d), _) => d.0,
                (None, Some(f)) => read_input(&f).await?,
                (None, None) => return Err(anyhow::anyhow!("--data or --file required")),
            };

            // Apply chunk layout
            let cfg = HandleConfig {
                layout: layout.into(),
                ..t.config().clone()
            };
            let t = t.with_config(cfg);

            info!(
                "Signing {} bytes with path: {}, review and approve on your device",
                data.len(),
                path
            );

            let s = t.sign_transaction(&path, &data, &DeviceApprover).await?;

            info!("signature: {}", hex::encode(&s.signature));

            if let Some(o) = output {
                write_output(&o, &s).await?;
            }
        }
        _ => unreachable!(),
    }

    Ok(())
}

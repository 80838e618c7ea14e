// Copyright (c) 2022-2023 Aptos Labs

use std::time::Duration;

use clap::Parser;
use log::{debug, info, LevelFilter};

use ledger_aptos_sim::*;

/// Speculos automation tool for the Aptos app
///
/// This drives the Speculos REST API to press buttons or play
/// review navigations against a running emulator.
#[derive(Clone, Debug, PartialEq, Parser)]
pub struct Args {
    /// Speculos REST API URL
    #[clap(long, env = "SPECULOS_API", default_value = DEFAULT_API_URL)]
    api: String,

    /// Delay between button presses in milliseconds
    #[clap(long, default_value = "250")]
    delay_ms: u64,

    #[clap(subcommand)]
    cmd: Command,

    /// Log level
    #[clap(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[derive(Clone, Debug, PartialEq, Parser)]
pub enum Command {
    /// Apply a single button action
    Press {
        #[clap(value_enum)]
        button: Button,

        #[clap(long, value_enum, default_value = "press-and-release")]
        action: Action,
    },
    /// Play a review navigation
    Navigate {
        /// Navigation flow
        #[clap(subcommand)]
        flow: Flow,

        /// Select reject instead of approve
        #[clap(long)]
        reject: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Parser)]
pub enum Flow {
    /// Aptos coin transfer review
    Transfer {
        #[clap(long, value_enum, env = "MODEL", default_value = "nanosp")]
        model: Model,
    },
    /// Step through `n` screens then approve
    Review { n: usize },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("reqwest");
    c.add_filter_ignore_str("hyper");

    let _ = simplelog::SimpleLogger::init(args.log_level, c.build());

    debug!("args: {:?}", args);

    let client = SpeculosClient::new(&args.api);

    match args.cmd {
        Command::Press { button, action } => {
            info!("Button {} {}", button, action);
            client.button(button, action).await?;
        }
        Command::Navigate { flow, reject } => {
            let mut n = match flow {
                Flow::Transfer { model } => Navigation::transfer(model),
                Flow::Review { n } => Navigation::review(n),
            };
            if reject {
                n = n.reject();
            }

            info!("Navigating {} buttons ({})", n.buttons.len(), n.outcome);
            n.run(&client, Duration::from_millis(args.delay_ms)).await?;
        }
    }

    Ok(())
}

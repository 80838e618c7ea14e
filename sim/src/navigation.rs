// Copyright (c) 2022-2023 Aptos Labs

//! Scripted review navigation

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use ledger_aptos::{Approval, Approver};

use crate::{Button, Error, Model, SpeculosClient};

/// Default delay between button presses
pub const DEFAULT_PRESS_DELAY: Duration = Duration::from_millis(250);

/// Ordered button presses for an on-device review, and the outcome
/// they select
#[derive(Clone, Debug, PartialEq)]
pub struct Navigation {
    pub buttons: Vec<Button>,
    pub outcome: Approval,
}

impl Navigation {
    /// Step through `n` screens then approve
    pub fn review(n: usize) -> Self {
        let mut buttons = vec![Button::Right; n];
        buttons.push(Button::Both);

        Self {
            buttons,
            outcome: Approval::Approved,
        }
    }

    /// Review and approve an Aptos coin transfer
    pub fn transfer(model: Model) -> Self {
        let nanos = model == Model::NanoS;
        let mut buttons = vec![];

        // Review transaction, function
        buttons.extend([Button::Right, Button::Right]);

        // Coin type, NanoS needs an extra screen
        if nanos {
            buttons.push(Button::Right);
        }
        buttons.push(Button::Right);

        // Receiver, NanoS needs two extra screens
        if nanos {
            buttons.extend([Button::Right, Button::Right]);
        }
        buttons.extend([Button::Right, Button::Right]);

        // Amount, gas fee
        buttons.extend([Button::Right, Button::Right]);

        buttons.push(Button::Both);

        Self {
            buttons,
            outcome: Approval::Approved,
        }
    }

    /// Move one screen past approve and select reject
    pub fn reject(mut self) -> Self {
        let i = match self.buttons.last() {
            Some(Button::Both) => self.buttons.len() - 1,
            _ => {
                self.buttons.push(Button::Both);
                self.buttons.len() - 1
            }
        };
        self.buttons.insert(i, Button::Right);
        self.outcome = Approval::Rejected;

        self
    }

    /// Play this navigation against a Speculos instance
    pub async fn run(&self, c: &SpeculosClient, delay: Duration) -> Result<(), Error> {
        debug!("Navigating: {:?}", self.buttons);

        for b in &self.buttons {
            tokio::time::sleep(delay).await;
            c.press(*b).await?;
        }

        Ok(())
    }
}

/// [Approver] playing a [Navigation] against a Speculos instance
#[derive(Clone, Debug)]
pub struct NavigationApprover {
    client: SpeculosClient,
    navigation: Navigation,
    delay: Duration,
}

impl NavigationApprover {
    pub fn new(client: SpeculosClient, navigation: Navigation) -> Self {
        Self {
            client,
            navigation,
            delay: DEFAULT_PRESS_DELAY,
        }
    }

    /// Set the delay between button presses
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Approver for NavigationApprover {
    async fn confirm(&self) -> anyhow::Result<Approval> {
        self.navigation.run(&self.client, self.delay).await?;

        Ok(self.navigation.outcome)
    }
}

// Copyright (c) 2022-2023 Aptos Labs

//! Speculos REST API client

use log::debug;
use serde::Serialize;

use crate::{Action, Button, Error};

/// Default Speculos REST API address
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Speculos REST API client
#[derive(Clone, Debug)]
pub struct SpeculosClient {
    base: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ButtonReq {
    action: Action,
}

impl Default for SpeculosClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl SpeculosClient {
    /// Create a client for the Speculos API at `base` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();

        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the API base URL
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Apply a button action
    pub async fn button(&self, button: Button, action: Action) -> Result<(), Error> {
        let url = format!("{}/button/{}", self.base, button);

        debug!("Sending button {} {} ({})", button, action, url);

        let r = self
            .client
            .post(&url)
            .json(&ButtonReq { action })
            .send()
            .await?;

        if !r.status().is_success() {
            return Err(Error::Status(r.status()));
        }

        Ok(())
    }

    /// Press and release a button
    pub async fn press(&self, button: Button) -> Result<(), Error> {
        self.button(button, Action::PressAndRelease).await
    }
}

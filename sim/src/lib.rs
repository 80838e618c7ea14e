// Copyright (c) 2022-2023 Aptos Labs

//! Speculos emulator automation for Aptos app tests
//!
//! This drives the Speculos REST API to press buttons on an emulated
//! device, and provides [NavigationApprover] to play scripted review
//! flows as an [ledger_aptos::Approver].

use strum::{Display, EnumString};

mod client;
pub use client::{SpeculosClient, DEFAULT_API_URL};

mod navigation;
pub use navigation::{Navigation, NavigationApprover, DEFAULT_PRESS_DELAY};

/// Emulated device model
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum Model {
    /// Nano S
    NanoS,
    /// Nano S Plus
    NanoSP,
    /// Nano X
    NanoX,
}

/// Device button
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Button {
    Left,
    Right,
    Both,
}

/// Button action
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    serde::Serialize,
    clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Press,
    Release,
    #[default]
    PressAndRelease,
}

/// Emulator automation error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Speculos rejected the request
    #[error("Unexpected response status: {0}")]
    Status(reqwest::StatusCode),
}

//! BLE LED/button remote.
//!
//! Connects to a peripheral exposing an LED characteristic, a button
//! characteristic and a PSDI device identifier, drives the connection
//! lifecycle end to end, and reports state through a [`Presenter`].
//!
//! [`Presenter`]: domain::presenter::Presenter

pub mod domain;
pub mod infrastructure;
pub mod presentation;

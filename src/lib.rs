//! Chiller controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

// The board code paths compile on `target_os` but link against crates
// that only the feature pulls in.
#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for ESP-IDF requires `--features espidf`");

pub mod app;
pub mod bringup;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod fsm;
pub mod halt;
pub mod safety;
pub mod sensors;
pub mod timebase;

pub mod adapters;
pub mod drivers;

pub mod pins;

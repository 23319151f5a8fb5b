//! RP2040-specific HAL for the Glint controller
//!
//! This crate provides RP2040-specific implementations of the shared
//! `glint-hal` traits:
//!
//! - Blocking serial transmitter for the gimbal link
//! - Flash storage driver (implements `glint_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod uart;

// Re-export shared traits from glint-hal for convenience
pub use glint_hal::{FlashStorage as FlashStorageTrait, StorageKey, UartConfig, UartTx as UartTxTrait};

//! Glint Hardware Abstraction Layer
//!
//! Traits that chip-specific HALs implement so the gimbal driver and the
//! firmware logic stay independent of the board they run on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  glint-drivers / glint-firmware         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  glint-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ glint-hal-    │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`] - Blocking serial transmit (gimbal command link)
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use uart::{UartConfig, UartTx};

//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in glint-core:
//!
//! - Gimbal link (command frames over a transmit-only UART)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gimbal;

pub use gimbal::{GimbalLink, LinkError};

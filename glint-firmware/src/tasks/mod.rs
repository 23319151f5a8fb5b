//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! The gimbal task runs on core 1; the rest share core 0.

pub mod console_rx;
pub mod console_tx;
pub mod gimbal;
pub mod persistence;

pub use console_rx::console_rx_task;
pub use console_tx::{console_tx_task, send_report};
pub use gimbal::{gimbal_task, GimbalUartLink};
pub use persistence::persistence_task;

//! UART serial communication abstractions
//!
//! The gimbal link is transmit-only and blocking: a command frame is
//! fully written before the next point is computed.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_blocking(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// 115200 8N1, what the gimbal controller board expects
    fn default() -> Self {
        Self {
            baudrate: 115200,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

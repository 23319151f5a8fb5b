//! Blocking serial transmitter for the gimbal link

use embassy_rp::uart;
use glint_hal::uart::{Parity, StopBits, UartConfig};
use glint_hal::UartTx;

/// Translate a board-agnostic UART config into embassy's
pub fn embassy_config(config: &UartConfig) -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}

/// Adapts any blocking `embedded_io::Write` (e.g. `embassy_rp::uart::UartTx`
/// in blocking mode) to [`UartTx`]
pub struct SerialTx<W> {
    inner: W,
}

impl<W: embedded_io::Write> SerialTx<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Release the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: embedded_io::Write> UartTx for SerialTx<W> {
    type Error = W::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

//! Glint - Laser Gimbal Controller Firmware
//!
//! Main firmware binary for an RP2040 driving a two-axis laser gimbal.
//! Core 0 runs the operator console and flash persistence; core 1 owns
//! the gimbal link and executes commands, including whole playbacks.
//!
//! Pinout:
//! - UART0 TX (GPIO0): gimbal controller board
//! - UART1 TX/RX (GPIO4/GPIO5): operator console

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart, UartTx};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use glint_core::config::GlintConfig;
use glint_drivers::GimbalLink;
use glint_hal_rp2040::flash::Rp2040FlashStorage;
use glint_hal_rp2040::uart::{embassy_config, SerialTx};
use glint_hal_rp2040::UartConfig as GimbalUartConfig;

use crate::channels::SHARED;
use crate::config::{load_calibration, load_config};

mod channels;
mod config;
mod scripts;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static GLINT_CONFIG: StaticCell<GlintConfig> = StaticCell::new();

static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Main entry point (core 0)
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Glint firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration and calibration come from flash; the storage is then
    // handed to the persistence task
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let config: &'static GlintConfig = GLINT_CONFIG.init(load_config(&mut storage).await);
    let calibration = load_calibration(&mut storage).await;

    // Operator console
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for console communication");

    // Gimbal link: transmit only, blocking
    let gimbal_uart_config = embassy_config(&GimbalUartConfig::with_baudrate(config.link.baudrate));
    let gimbal_tx = UartTx::new_blocking(p.UART0, p.PIN_0, gimbal_uart_config);
    let link = GimbalLink::new(SerialTx::new(gimbal_tx), &SHARED);

    info!("Gimbal UART initialized at {} baud", config.link.baudrate);

    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| {
            spawner
                .spawn(tasks::gimbal_task(link, calibration, config))
                .unwrap()
        })
    });

    spawner.spawn(tasks::console_rx_task(rx)).unwrap();
    spawner.spawn(tasks::console_tx_task(tx)).unwrap();
    spawner.spawn(tasks::persistence_task(storage)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

//! Console UART receive task
//!
//! Receives frames from the operator console and dispatches commands.
//! Stop is acted on here directly so it reaches a running playback on the
//! other core without waiting in the command queue.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use glint_protocol::{ConsoleCommand, ConsoleParser, ControllerReport, StatusCode};

use super::send_report;
use crate::channels::{COMMAND_CHANNEL, SHARED};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Console RX task - receives and parses frames from the operator console
#[embassy_executor::task]
pub async fn console_rx_task(mut rx: BufferedUartRx) {
    info!("Console RX task started");

    let mut parser = ConsoleParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match ConsoleCommand::from_frame(&frame) {
                            Ok(cmd) => handle_console_command(cmd),
                            Err(e) => {
                                warn!("Failed to parse console command: {:?}", e);
                                send_report(ControllerReport::Status(StatusCode::Invalid));
                            }
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

fn handle_console_command(cmd: ConsoleCommand) {
    match cmd {
        ConsoleCommand::Ping => {
            trace!("PING received");
            send_report(ControllerReport::Pong);
        }
        ConsoleCommand::Stop => {
            if SHARED.is_running() {
                info!("Stop requested, cancelling playback");
            } else {
                debug!("Stop requested while idle");
            }
            SHARED.request_stop();
            send_report(ControllerReport::Status(StatusCode::Ok));
        }
        cmd => {
            if cmd == ConsoleCommand::Shutdown {
                // End any running playback so the shutdown is picked up
                SHARED.request_stop();
            }
            debug!("Queueing command: {:?}", cmd);
            if COMMAND_CHANNEL.try_send(cmd).is_err() {
                warn!("Command channel full, dropping {:?}", cmd);
                send_report(ControllerReport::Status(StatusCode::Invalid));
            }
        }
    }
}

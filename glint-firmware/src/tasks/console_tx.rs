//! Console UART transmit task
//!
//! Sends status reports and angle readbacks to the operator console.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use glint_protocol::ControllerReport;

use crate::channels::{ANGLES, REPORT_CHANNEL};

/// Queue a report for the console, dropping it if the queue is full
pub fn send_report(report: ControllerReport) {
    if REPORT_CHANNEL.try_send(report).is_err() {
        warn!("Report channel full, dropping {:?}", report);
    }
}

/// Console TX task - sends frames to the operator console
#[embassy_executor::task]
pub async fn console_tx_task(mut tx: BufferedUartTx) {
    info!("Console TX task started");

    loop {
        let report = match select(REPORT_CHANNEL.receive(), ANGLES.wait()).await {
            Either::First(report) => report,
            Either::Second((yaw, pitch, laser)) => ControllerReport::Angles { yaw, pitch, laser },
        };
        send_frame(&mut tx, report).await;
    }
}

async fn send_frame(tx: &mut BufferedUartTx, report: ControllerReport) {
    let frame = match report.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to build report frame: {:?}", e);
            return;
        }
    };

    let mut buf = [0u8; 32];
    match frame.encode(&mut buf) {
        Ok(len) => {
            if let Err(e) = tx.write_all(&buf[..len]).await {
                warn!("Failed to send report: {:?}", e);
            } else {
                trace!("Report sent: {:?}", report);
            }
        }
        Err(e) => warn!("Failed to encode report: {:?}", e),
    }
}

//! Calibration persistence task
//!
//! Owns the flash storage after boot and writes calibration points on
//! request. Flash writes stay off core 1 so they never stall the gimbal.

use defmt::*;

use glint_hal_rp2040::flash::Rp2040FlashStorage;
use glint_protocol::{ControllerReport, StatusCode};

use super::send_report;
use crate::channels::CALIBRATION_SAVE;
use crate::config::save_calibration;

#[embassy_executor::task]
pub async fn persistence_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Persistence task started");

    loop {
        let points = CALIBRATION_SAVE.wait().await;

        let status = match save_calibration(&mut storage, &points).await {
            Ok(()) => {
                info!("Calibration saved");
                StatusCode::Ok
            }
            Err(e) => {
                error!("Failed to save calibration: {:?}", e);
                StatusCode::SaveFailed
            }
        };
        send_report(ControllerReport::Status(status));
    }
}

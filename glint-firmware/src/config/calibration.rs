//! Calibration persistence
//!
//! The four destination points are stored as one comma-separated text line
//! under `StorageKey::Calibration`. Missing or unusable data leaves the
//! default corner targets in place but the gimbal uncalibrated until the
//! operator captures all four corners.

use core::str;
use defmt::*;

use glint_core::calibration::{
    format_points, restore_session, CalibrationError, CalibrationSession, CALIBRATION_TEXT_LEN,
};
use glint_core::Point;
use glint_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use glint_hal_rp2040::FlashStorageTrait;

/// Calibration persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Points could not be formatted into the text line
    Format(CalibrationError),
}

/// Load the calibration from flash
///
/// Only a valid stored line yields a calibrated session.
pub async fn load_calibration(storage: &mut Rp2040FlashStorage<'_>) -> CalibrationSession {
    let mut buffer = [0u8; CALIBRATION_TEXT_LEN];
    let text = match storage.read(StorageKey::Calibration, &mut buffer).await {
        Ok(len) => match str::from_utf8(&buffer[..len]) {
            Ok(text) => Some(text),
            Err(_) => {
                warn!("Stored calibration is not valid UTF-8");
                None
            }
        },
        Err(FlashError::NotFound) => {
            debug!("No calibration in flash");
            None
        }
        Err(e) => {
            warn!("Failed to read calibration: {:?}", e);
            None
        }
    };

    let (session, error) = restore_session(text);
    match error {
        None if session.is_calibrated() => {
            info!("Loaded calibration from flash");
            log_points(session.destinations());
        }
        None => info!("Not calibrated, capture all four corners"),
        Some(e) => warn!("Stored calibration unusable: {:?}, not calibrated", e),
    }
    session
}

/// Save destination points to flash
pub async fn save_calibration(
    storage: &mut Rp2040FlashStorage<'_>,
    points: &[Point; 4],
) -> Result<(), PersistError> {
    let text = format_points(points).map_err(PersistError::Format)?;

    debug!("Saving calibration: {}", text.as_str());

    storage
        .write(StorageKey::Calibration, text.as_bytes())
        .await
        .map_err(PersistError::Flash)
}

fn log_points(points: &[Point; 4]) {
    for (i, p) in points.iter().enumerate() {
        debug!("  corner {}: yaw {}, pitch {}", i + 1, p.x, p.y);
    }
}

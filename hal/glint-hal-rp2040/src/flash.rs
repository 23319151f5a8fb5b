//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 64KB of flash. Holds the calibration line and the optional config
//! override.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use glint_hal::flash::{FlashError, StorageKey};

/// Flash layout
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB on the Pico
pub const STORAGE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORAGE_PARTITION_START: usize = FLASH_SIZE - STORAGE_PARTITION_SIZE;

/// Largest value stored under any key (the config TOML)
pub const MAX_ITEM_SIZE: usize = 2048;

/// Flash range for the storage partition
pub const STORAGE_RANGE: core::ops::Range<u32> =
    (STORAGE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// RP2040 flash storage
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl glint_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; MAX_ITEM_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > MAX_ITEM_SIZE {
            return Err(FlashError::BufferTooSmall);
        }
        let mut data_buffer = [0u8; MAX_ITEM_SIZE];

        map::store_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(storage_error)
    }
}

/// Separate driver failures from map-level (format, corruption) failures
fn storage_error<E>(error: sequential_storage::Error<E>) -> FlashError {
    match error {
        sequential_storage::Error::Storage { .. } => FlashError::Flash,
        _ => FlashError::Storage,
    }
}

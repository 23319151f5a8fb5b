//! Flash storage abstractions
//!
//! Persistent key-value storage for calibration and configuration data.

/// Storage keys for persisted data
///
/// The storage implementation handles wear leveling and data integrity.
/// Each key is stored as its single byte value, which host tooling relies
/// on when provisioning items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Calibration destination points, as a comma-separated text line
    Calibration = 0,
    /// Configuration override as TOML text
    ///
    /// Read at boot only; written from the host before boot, never by
    /// the firmware.
    ConfigToml = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Calibration),
            1 => Some(StorageKey::ConfigToml),
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
}

/// Flash storage trait
///
/// Wear-leveled key-value storage. Values are opaque byte strings.
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key, replacing any previous value
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_roundtrip() {
        for key in [StorageKey::Calibration, StorageKey::ConfigToml] {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(0x7F), None);
    }

    #[test]
    fn test_key_bytes_are_stable() {
        assert_eq!(StorageKey::Calibration.as_u8(), 0);
        assert_eq!(StorageKey::ConfigToml.as_u8(), 1);
    }

    #[cfg(feature = "sequential-storage")]
    #[test]
    fn test_key_serializes_to_one_byte() {
        use sequential_storage::map::Key;

        let mut buffer = [0xFFu8; 4];
        assert_eq!(StorageKey::ConfigToml.serialize_into(&mut buffer).unwrap(), 1);
        assert_eq!(buffer[0], 1);
        let (key, used) = StorageKey::deserialize_from(&buffer[..1]).unwrap();
        assert_eq!((key, used), (StorageKey::ConfigToml, 1));
    }
}

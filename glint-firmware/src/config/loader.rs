//! Configuration loading
//!
//! A TOML override stored in flash wins when present and valid. Otherwise
//! the embedded `gimbal.toml` is used, and if even that fails to parse the
//! built-in defaults.
//!
//! The firmware only reads the override. It is provisioned from the host
//! before boot as a sequential-storage map item in the storage partition
//! (the last 64KB of flash): key byte `1` (`StorageKey::ConfigToml`),
//! value the raw UTF-8 TOML, at most 2048 bytes. Without it, changing the
//! configuration means editing `gimbal.toml` and reflashing.

use core::str;
use defmt::*;

use glint_core::config::{parse_config, GlintConfig, ParseError};
use glint_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use glint_hal_rp2040::FlashStorageTrait;

/// Embedded default configuration (compiled into firmware)
/// Edit gimbal.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../gimbal.toml");

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 2048;

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    Parse(ParseError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Load the active configuration
pub async fn load_config(storage: &mut Rp2040FlashStorage<'_>) -> GlintConfig {
    match load_override(storage).await {
        Ok(config) => {
            info!("Loaded configuration override from flash");
            log_config_summary(&config);
            return config;
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            debug!("No configuration override in flash");
        }
        Err(e) => {
            warn!("Ignoring configuration override: {:?}", e);
        }
    }

    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Using embedded configuration");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            // build.rs validates gimbal.toml, so this means the two
            // parsers disagree
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            GlintConfig::default()
        }
    }
}

async fn load_override(storage: &mut Rp2040FlashStorage<'_>) -> Result<GlintConfig, ConfigError> {
    let mut buffer = [0u8; MAX_TOML_SIZE];
    let len = storage.read(StorageKey::ConfigToml, &mut buffer).await?;

    debug!("Read {} bytes of TOML from flash", len);

    let toml_str = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;
    Ok(parse_config(toml_str)?)
}

fn log_config_summary(config: &GlintConfig) {
    debug!(
        "  link: {} baud, startup beep {}",
        config.link.baudrate, config.link.startup_beep
    );
    debug!(
        "  playback: {} ms/point, seed {}",
        config.playback.point_delay_ms, config.playback.seed
    );
}

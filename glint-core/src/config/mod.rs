//! Configuration types and parsing

pub mod parse;
pub mod types;

pub use crate::playback::PlaybackConfig;
pub use parse::{parse_config, ParseError};
pub use types::{GlintConfig, LinkConfig, ShapeSet};

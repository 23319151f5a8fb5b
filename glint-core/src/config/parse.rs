//! Minimal TOML parser for controller configuration
//!
//! Handles only the subset `gimbal.toml` uses. It does NOT support the
//! full TOML spec.
//!
//! Supported features:
//! - `[section]` headers (`link`, `playback`, `shapes`)
//! - `key = value` with integer, float, boolean and flat float-array values
//! - Comments (`# ...`), full-line or trailing
//!
//! NOT supported:
//! - Strings, dates, inline tables, nested arrays
//! - Dotted keys and sub-sections
//!
//! Unknown keys are ignored so newer files still load on older firmware.

use super::types::GlintConfig;
use crate::geometry::Point;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or does not parse
    InvalidValue,
    /// Array has the wrong number of elements
    WrongLength,
    /// A line is neither a header nor `key = value`
    InvalidLine,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Playback,
    Shapes,
}

/// Parse TOML configuration on top of the defaults
pub fn parse_config(input: &str) -> Result<GlintConfig, ParseError> {
    let mut config = GlintConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "link" => Ok(Section::Link),
        "playback" => Ok(Section::Playback),
        "shapes" => Ok(Section::Shapes),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut GlintConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Link => {
            let link = &mut config.link;
            match key {
                "baudrate" => link.baudrate = parse_int(value)?,
                "startup_beep" => link.startup_beep = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Playback => {
            let playback = &mut config.playback;
            match key {
                "point_delay_ms" => playback.point_delay_ms = parse_int(value)?,
                "seed" => playback.seed = parse_bool(value)?,
                "seed_beep_ms" => playback.seed_beep_ms = parse_int(value)?,
                "seed_settle_ms" => playback.seed_settle_ms = parse_int(value)?,
                "finish_settle_ms" => playback.finish_settle_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Shapes => {
            let shapes = &mut config.shapes;
            match key {
                "triangle" => {
                    let [ax, ay, bx, by, cx, cy] = parse_floats::<6>(value)?;
                    shapes.triangle = [
                        Point::new(ax, ay),
                        Point::new(bx, by),
                        Point::new(cx, cy),
                    ];
                }
                "rectangle" => {
                    let [x0, y0, x1, y1] = parse_floats::<4>(value)?;
                    shapes.rectangle_min = Point::new(x0, y0);
                    shapes.rectangle_max = Point::new(x1, y1);
                }
                "circle_center" => {
                    let [x, y] = parse_floats::<2>(value)?;
                    shapes.circle_center = Point::new(x, y);
                }
                "circle_radius" => shapes.circle_radius = parse_float(value)?,
                "sine_amplitude" => shapes.sine_amplitude = parse_float(value)?,
                "sine_offset" => shapes.sine_offset = parse_float(value)?,
                "sine_wavelength" => shapes.sine_wavelength = parse_float(value)?,
                _ => {}
            }
        }
    }
    Ok(())
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int(value: &str) -> Result<u32, ParseError> {
    let mut digits: heapless::String<16> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a float value (integers are accepted too)
fn parse_float(value: &str) -> Result<f32, ParseError> {
    let v: f32 = value.trim().parse().map_err(|_| ParseError::InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a flat array of exactly `N` floats, e.g. `[0.2, 0.2, 0.8, 0.8]`
fn parse_floats<const N: usize>(value: &str) -> Result<[f32; N], ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut out = [0.0f32; N];
    let mut count = 0;
    // A trailing comma is legal TOML
    for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if count == N {
            return Err(ParseError::WrongLength);
        }
        out[count] = parse_float(item)?;
        count += 1;
    }
    if count != N {
        return Err(ParseError::WrongLength);
    }
    Ok(out)
}

//! Line-oriented drawing scripts
//!
//! ```text
//! # comment
//! OFF
//! M 0.20 0.35
//! ON
//! M 0.25 0.35
//! M 0.30,0.40
//! OFF
//! ```
//!
//! A line with an `ON` or `OFF` token switches the laser. A line whose
//! first token is `M` moves to a normalized point given by the next two
//! numbers (separated by whitespace or a comma). Blank lines and `#`
//! comments are skipped. Steps come out in file order.

use super::ScriptError;
use crate::geometry::Point;

/// Base speed factor of the move delay, in angle units per millisecond
const MOVE_DELAY_BASE: f32 = 2.2;

/// Scale applied on top of the base speed
const MOVE_DELAY_SCALE: f32 = 2.5;

/// One script directive
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptStep {
    /// Switch the laser
    Laser(bool),
    /// Move to a normalized screen point
    MoveTo(Point),
}

/// A script error tagged with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScriptLineError {
    pub line: usize,
    pub error: ScriptError,
}

/// Parse one script line
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<ScriptStep>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    if line.split_whitespace().any(|t| t == "ON") {
        return Ok(Some(ScriptStep::Laser(true)));
    }
    if line.split_whitespace().any(|t| t == "OFF") {
        return Ok(Some(ScriptStep::Laser(false)));
    }

    match tokens.next() {
        Some("M") => {
            let x = parse_coordinate(tokens.next())?;
            let y = parse_coordinate(tokens.next())?;
            Ok(Some(ScriptStep::MoveTo(Point::new(x, y))))
        }
        _ => Err(ScriptError::UnknownDirective),
    }
}

fn parse_coordinate(token: Option<&str>) -> Result<f32, ScriptError> {
    let value: f32 = token
        .ok_or(ScriptError::MissingCoordinate)?
        .parse()
        .map_err(|_| ScriptError::InvalidNumber)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScriptError::InvalidNumber)
    }
}

/// Iterator over the steps of a script
///
/// Malformed lines are reported as errors and iteration continues with
/// the next line, so the caller decides whether to skip or abort.
#[derive(Debug, Clone)]
pub struct Script<'a> {
    lines: core::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Script<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_no: 0,
        }
    }
}

impl Iterator for Script<'_> {
    type Item = Result<ScriptStep, ScriptLineError>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            match parse_line(line) {
                Ok(Some(step)) => return Some(Ok(step)),
                Ok(None) => continue,
                Err(error) => {
                    return Some(Err(ScriptLineError {
                        line: self.line_no,
                        error,
                    }))
                }
            }
        }
        None
    }
}

/// Settling time after a scripted move, in microseconds
///
/// `2.5 × max(|Δyaw|, |Δpitch|) / 2.2` milliseconds.
pub fn move_delay_us(max_delta: u32) -> u32 {
    let ms = MOVE_DELAY_SCALE * max_delta as f32 / MOVE_DELAY_BASE;
    libm::roundf(ms * 1000.0) as u32
}
